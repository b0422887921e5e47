//! Filename index over a manifest, record lookup, and metadata updates.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::manifest::{Locator, Manifest, Record};
use crate::processor::XmlMetadata;
use crate::schema_sniffer::find_path_field;

/// Fields written into matched manifest records
pub const METADATA_FIELDS: [&str; 3] = ["isrc", "track_title", "artist"];

/// Reduce a path to its final component.
///
/// Both `/` and `\` count as separators and trailing separators are ignored,
/// so `s3://bucket/a/track.wav`, `C:\audio\track.wav` and `track.wav` all
/// reduce to `track.wav`.
pub fn bare_filename(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
}

/// Mapping from bare filename to the record holding it
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    path_field: Option<String>,
    entries: HashMap<String, Locator>,
}

impl FileIndex {
    /// Index every record by the filename in its path field.
    ///
    /// When no path field can be discovered the index is empty. Duplicate
    /// filenames resolve to the last record carrying them.
    pub fn build(manifest: &Manifest) -> Self {
        let Some(path_field) = find_path_field(manifest) else {
            warn!(
                shape = %manifest.shape(),
                "Could not find a path field in the manifest, file index will be empty"
            );
            return Self::default();
        };

        let mut entries = HashMap::new();
        for (locator, value) in manifest.field_values(&path_field) {
            let Some(path) = value.and_then(Value::as_str) else {
                continue;
            };
            let filename = bare_filename(path);
            if filename.is_empty() {
                continue;
            }
            if let Some(previous) = entries.insert(filename.to_string(), locator.clone()) {
                debug!(filename, %previous, current = %locator, "Duplicate filename in manifest");
            }
        }

        info!(
            path_field = %path_field,
            entries = entries.len(),
            "Built file index"
        );
        Self {
            path_field: Some(path_field),
            entries,
        }
    }

    pub fn path_field(&self) -> Option<&str> {
        self.path_field.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup; `filename` is reduced to its final component first
    pub fn get(&self, filename: &str) -> Option<&Locator> {
        self.entries.get(bare_filename(filename))
    }
}

/// A manifest record found by [`ManifestHandler::resolve`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecord {
    pub locator: Locator,
    pub record: Record,
}

/// Counts from one [`ManifestHandler::apply`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    pub updated: usize,
    pub skipped: usize,
}

/// Owns a manifest and its filename index for the duration of a run
#[derive(Debug, Clone)]
pub struct ManifestHandler {
    manifest: Manifest,
    index: FileIndex,
}

impl ManifestHandler {
    pub fn new(manifest: Manifest) -> Self {
        let index = FileIndex::build(&manifest);
        Self { manifest, index }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }

    /// Find the record for an audio filename.
    ///
    /// An exact index hit wins. Otherwise the first record whose path field
    /// contains the filename as a substring is returned, so `track1.wav` can
    /// also land on `track10.wav`.
    pub fn resolve(&self, audio_filename: &str) -> Option<ResolvedRecord> {
        let filename = bare_filename(audio_filename);

        if let Some(locator) = self.index.get(filename)
            && let Some(record) = self.manifest.record(locator)
        {
            return Some(ResolvedRecord {
                locator: locator.clone(),
                record,
            });
        }

        debug!(filename, "File not found in index, trying substring search");
        let path_field = self.index.path_field()?;
        if filename.is_empty() {
            return None;
        }
        self.manifest
            .field_values(path_field)
            .find(|(_, value)| {
                value
                    .and_then(Value::as_str)
                    .is_some_and(|path| path.contains(filename))
            })
            .and_then(|(locator, _)| {
                let record = self.manifest.record(&locator)?;
                Some(ResolvedRecord { locator, record })
            })
    }

    /// Write ISRC, title and artist into every record with an exact index hit.
    ///
    /// Absent values are written as nulls. Records without an index hit are
    /// skipped silently.
    pub fn apply(&mut self, records: &[XmlMetadata]) -> ApplyStats {
        info!("Updating manifest with metadata for {} files", records.len());
        let mut stats = ApplyStats::default();

        for metadata in records {
            let Some(locator) = self.index.get(&metadata.audio_filename) else {
                stats.skipped += 1;
                continue;
            };

            let values = [&metadata.isrc, &metadata.track_title, &metadata.artist];
            let mut written = true;
            for (field, value) in METADATA_FIELDS.iter().zip(values) {
                let value = value.clone().map_or(Value::Null, Value::String);
                written &= self.manifest.set_field(locator, field, value);
            }

            if written {
                stats.updated += 1;
            } else {
                stats.skipped += 1;
            }
        }

        info!(
            updated = stats.updated,
            skipped = stats.skipped,
            "Manifest update complete"
        );
        stats
    }
}
