//! Heuristic field extraction from schema-unknown XML documents.
//!
//! Each [`FieldKind`] owns a prioritized rule table. Extraction first walks the
//! structural rules in order; the first rule that locates anything decides the
//! result. Only when no structural rule matches does the keyword scan run over
//! every element and attribute in document order.

use roxmltree::Node;
use serde::{Deserialize, Serialize};

/// The metadata fields that can be pulled out of a catalogue document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Filename,
    Isrc,
    Title,
    Artist,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Filename,
        FieldKind::Isrc,
        FieldKind::Title,
        FieldKind::Artist,
    ];

    /// Structural rules, tried strictly in order
    pub fn rules(self) -> &'static [Locate] {
        match self {
            FieldKind::Filename => FILENAME_RULES,
            FieldKind::Isrc => ISRC_RULES,
            FieldKind::Title => TITLE_RULES,
            FieldKind::Artist => ARTIST_RULES,
        }
    }

    /// Keyword scan used when no structural rule matches
    pub fn fallback(self) -> &'static Fallback {
        match self {
            FieldKind::Filename => &FILENAME_FALLBACK,
            FieldKind::Isrc => &ISRC_FALLBACK,
            FieldKind::Title => &TITLE_FALLBACK,
            FieldKind::Artist => &ARTIST_FALLBACK,
        }
    }
}

/// A structural location pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locate {
    /// A chain of tag names below the document root. The first step may sit at
    /// any depth, every following step must be a direct child of the previous.
    Tags {
        path: &'static [&'static str],
        any_namespace: bool,
    },
    /// An un-namespaced attribute on any element below the document root
    Attribute(&'static str),
}

/// Loose keyword matching over tag and attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallback {
    /// Lowercase substrings accepted in an element's local name
    pub tag_keywords: &'static [&'static str],
    /// Lowercase substrings accepted in an attribute's local name
    pub attribute_keywords: &'static [&'static str],
    /// When set, the candidate value must contain this lowercase marker
    pub required_content: Option<&'static str>,
}

const fn tags(path: &'static [&'static str]) -> Locate {
    Locate::Tags {
        path,
        any_namespace: false,
    }
}

const fn any_ns(path: &'static [&'static str]) -> Locate {
    Locate::Tags {
        path,
        any_namespace: true,
    }
}

const FILENAME_RULES: &[Locate] = &[
    tags(&["FileName"]),
    tags(&["AudioFileName"]),
    tags(&["SoundRecording", "FileName"]),
    Locate::Attribute("filename"),
    Locate::Attribute("audioFileName"),
    any_ns(&["FileName"]),
    any_ns(&["AudioFileName"]),
    any_ns(&["SoundRecording", "FileName"]),
];

const ISRC_RULES: &[Locate] = &[tags(&["ISRC"]), Locate::Attribute("isrc"), any_ns(&["ISRC"])];

const TITLE_RULES: &[Locate] = &[
    tags(&["Title"]),
    tags(&["TrackTitle"]),
    tags(&["SoundRecording", "Title"]),
    Locate::Attribute("title"),
    Locate::Attribute("trackTitle"),
    any_ns(&["Title"]),
    any_ns(&["TrackTitle"]),
];

const ARTIST_RULES: &[Locate] = &[
    tags(&["Artist"]),
    tags(&["ArtistName"]),
    tags(&["Performer", "Name"]),
    Locate::Attribute("artist"),
    Locate::Attribute("artistName"),
    any_ns(&["Artist"]),
    any_ns(&["ArtistName"]),
    any_ns(&["Performer", "Name"]),
];

const FILENAME_FALLBACK: Fallback = Fallback {
    tag_keywords: &["filename", "audiofilename", "soundrecording"],
    attribute_keywords: &["filename", "file", "audio"],
    required_content: Some(".wav"),
};

const ISRC_FALLBACK: Fallback = Fallback {
    tag_keywords: &["isrc"],
    attribute_keywords: &["isrc"],
    required_content: None,
};

const TITLE_FALLBACK: Fallback = Fallback {
    tag_keywords: &["title", "tracktitle"],
    attribute_keywords: &["title", "tracktitle"],
    required_content: None,
};

const ARTIST_FALLBACK: Fallback = Fallback {
    tag_keywords: &["artist", "performer", "creator"],
    attribute_keywords: &["artist", "performer", "creator"],
    required_content: None,
};

/// Extract a single field from a parsed document.
///
/// Returns `None` both when nothing matched and when the winning match carries
/// no text (for example `<ISRC/>`).
pub fn extract(root: Node<'_, '_>, kind: FieldKind) -> Option<String> {
    for rule in kind.rules() {
        if let Some(hit) = locate(root, rule) {
            return hit;
        }
    }
    scan(root, kind.fallback())
}

/// Apply one structural rule.
///
/// The outer `Option` reports whether the rule matched at all, the inner one
/// carries the matched value, which may be absent for an empty element.
pub fn locate(root: Node<'_, '_>, rule: &Locate) -> Option<Option<String>> {
    match *rule {
        Locate::Tags {
            path,
            any_namespace,
        } => {
            let (first, rest) = path.split_first()?;
            root.descendants()
                .skip(1)
                .filter(|node| tag_matches(node, first, any_namespace))
                .find_map(|start| follow(start, rest, any_namespace))
                .map(|node| node.text().map(str::to_string))
        }
        Locate::Attribute(name) => root
            .descendants()
            .skip(1)
            .filter(|node| node.is_element())
            .find_map(|node| node.attribute(name))
            .map(|value| Some(value.to_string())),
    }
}

fn follow<'a, 'input>(
    node: Node<'a, 'input>,
    rest: &[&str],
    any_namespace: bool,
) -> Option<Node<'a, 'input>> {
    match rest.split_first() {
        None => Some(node),
        Some((step, tail)) => node
            .children()
            .filter(|child| tag_matches(child, step, any_namespace))
            .find_map(|child| follow(child, tail, any_namespace)),
    }
}

fn tag_matches(node: &Node<'_, '_>, name: &str, any_namespace: bool) -> bool {
    if !node.is_element() {
        return false;
    }
    let tag = node.tag_name();
    tag.name() == name && (any_namespace || tag.namespace().is_none())
}

/// Keyword scan over the whole document, root included.
pub fn scan(root: Node<'_, '_>, fallback: &Fallback) -> Option<String> {
    let accepts = |value: &str| match fallback.required_content {
        Some(marker) => value.to_lowercase().contains(marker),
        None => true,
    };

    for node in root.descendants().filter(|node| node.is_element()) {
        if contains_any(node.tag_name().name(), fallback.tag_keywords) {
            // Without a content constraint the first named element decides, text or not.
            if fallback.required_content.is_none() {
                return node.text().map(str::to_string);
            }
            if let Some(text) = node.text()
                && accepts(text)
            {
                return Some(text.to_string());
            }
        }

        for attribute in node.attributes() {
            if contains_any(attribute.name(), fallback.attribute_keywords)
                && accepts(attribute.value())
            {
                return Some(attribute.value().to_string());
            }
        }
    }

    None
}

fn contains_any(name: &str, keywords: &[&str]) -> bool {
    let lowered = name.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}
