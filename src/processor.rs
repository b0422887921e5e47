//! Turns one XML catalogue file into an [`XmlMetadata`] record.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use roxmltree::{Document, ParsingOptions};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogueError, Result};
use crate::extractor::{FieldKind, extract};

/// Metadata extracted from a single XML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlMetadata {
    /// XML file the record came from
    pub source_path: PathBuf,
    /// Audio filename as written in the document (may include directories)
    pub audio_filename: String,
    pub isrc: Option<String>,
    pub track_title: Option<String>,
    pub artist: Option<String>,
}

/// Parses XML files and runs extraction for every field
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentProcessor;

impl DocumentProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Read and process a file from disk
    pub fn process_file(&self, path: &Path) -> Result<XmlMetadata> {
        let bytes = std::fs::read(path)?;
        let content = decode_document(&bytes).map_err(|details| CatalogueError::XmlParse {
            file: path.to_path_buf(),
            details,
        })?;
        self.process_str(path, &content)
    }

    /// Process XML text already in memory; `source_path` is recorded on the result
    pub fn process_str(&self, source_path: &Path, content: &str) -> Result<XmlMetadata> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let document =
            Document::parse_with_options(content, options).map_err(|e| CatalogueError::XmlParse {
                file: source_path.to_path_buf(),
                details: e.to_string(),
            })?;

        let root = document.root_element();
        let [filename, isrc, track_title, artist] = FieldKind::ALL.map(|kind| extract(root, kind));

        let audio_filename = filename
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CatalogueError::MissingIdentifier {
                file: source_path.to_path_buf(),
            })?;

        Ok(XmlMetadata {
            source_path: source_path.to_path_buf(),
            audio_filename,
            isrc,
            track_title,
            artist,
        })
    }
}

/// Decode raw file bytes to text.
///
/// A byte order mark wins; otherwise the `encoding` pseudo-attribute of the
/// XML declaration is honoured, defaulting to UTF-8.
fn decode_document(bytes: &[u8]) -> std::result::Result<Cow<'_, str>, String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_length)) => (encoding, &bytes[bom_length..]),
        None => {
            let encoding = match declared_encoding(bytes) {
                Some(label) => Encoding::for_label(label.as_bytes())
                    .ok_or_else(|| format!("unsupported encoding: {}", label))?,
                None => UTF_8,
            };
            (encoding, bytes)
        }
    };

    let (content, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(format!("file is not valid {}", encoding.name()));
    }
    Ok(content)
}

fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let prolog = bytes.strip_prefix(b"<?xml")?;
    let end = prolog.windows(2).position(|pair| pair == b"?>")?;
    let declaration = std::str::from_utf8(&prolog[..end]).ok()?;

    let rest = &declaration[declaration.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let label = &value[..value.find(quote)?];
    Some(label.to_string())
}
