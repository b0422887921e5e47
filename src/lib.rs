//! # catalogue-match Library
//!
//! Extracts audio filename, ISRC, title and artist from XML catalogue files
//! concurrently and merges them into a storage manifest (CSV, JSON or Excel).

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod error_reporter;
pub mod extractor;
pub mod file_discovery;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod persistence;
pub mod pipeline;
pub mod processor;
pub mod record_index;
pub mod schema_sniffer;

pub use batch::{
    BatchConfig, BatchCoordinator, BatchProgress, BatchResults, FileFailure, FileOutcome,
    ProgressCallback,
};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager};
pub use error::{CatalogueError, Result};
pub use error_reporter::ErrorReporter;
pub use extractor::FieldKind;
pub use file_discovery::{DiscoveredFiles, FileDiscovery};
pub use manifest::{Locator, Manifest, ManifestShape, Record, Table};
pub use output::Output;
pub use persistence::{ManifestFormat, load_manifest, save_manifest};
pub use pipeline::{CatalogueJob, CatalogueReport, RunOutcome, process_catalogue};
pub use processor::{DocumentProcessor, XmlMetadata};
pub use record_index::{ApplyStats, FileIndex, ManifestHandler, ResolvedRecord};
pub use schema_sniffer::find_path_field;
