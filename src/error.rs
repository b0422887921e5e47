use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unsupported manifest file format: {extension} ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Invalid manifest: {path} - {details}")]
    InvalidManifest { path: PathBuf, details: String },

    #[error("XML parsing failed: {file} - {details}")]
    XmlParse { file: PathBuf, details: String },

    #[error("No audio filename found in {file}")]
    MissingIdentifier { file: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },

    #[error("File system traversal error: {path} - {reason}")]
    FileSystemTraversal { path: PathBuf, reason: String },
}

impl CatalogueError {
    /// Per-file failures are absorbed by the batch; everything else aborts the run.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            CatalogueError::XmlParse { .. } | CatalogueError::MissingIdentifier { .. }
        )
    }
}

impl From<ConfigError> for CatalogueError {
    fn from(err: ConfigError) -> Self {
        CatalogueError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CatalogueError>;
