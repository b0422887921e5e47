use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
    /// Show all available debugging information
    Debug,
}

/// How the run report is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Human,
    /// Machine-readable JSON report
    Json,
    /// Single summary line
    Summary,
}

/// Match XML catalogue metadata against a storage manifest
#[derive(Parser, Debug, Clone)]
#[command(name = "catalogue-match")]
#[command(
    about = "Extract ISRC, title and artist from XML catalogue files and merge them into a manifest"
)]
#[command(version)]
pub struct Cli {
    /// Path to the manifest file (CSV, JSON, or Excel)
    #[arg(long = "manifest")]
    pub manifest: PathBuf,

    /// Directory containing XML files to process
    #[arg(long = "xml-dir")]
    pub xml_dir: PathBuf,

    /// Path for the output file (format determined by extension)
    #[arg(long = "output")]
    pub output: PathBuf,

    /// Maximum number of concurrent workers (default: CPU count)
    #[arg(long = "max-workers")]
    pub max_workers: Option<usize>,

    /// Limit the number of XML files to process (for testing)
    #[arg(long = "limit")]
    pub limit: Option<usize>,

    /// Configuration file (TOML or JSON)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Verbose output plus error chains and run timings
    #[arg(long = "debug", conflicts_with = "quiet")]
    pub debug: bool,

    /// Quiet mode (warnings and errors only)
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show a progress line while processing XML files
    #[arg(long = "progress")]
    pub progress: bool,

    /// Append log output to this file
    #[arg(long = "log-file", conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long = "no-log-file")]
    pub no_log_file: bool,

    /// Only process XML files matching these patterns (glob syntax)
    #[arg(long = "include", action = clap::ArgAction::Append)]
    pub include_patterns: Vec<String>,

    /// Skip XML files matching these patterns (glob syntax)
    #[arg(long = "exclude", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check the input paths and numeric arguments before any work starts
    pub fn validate(&self) -> Result<(), String> {
        if !self.manifest.is_file() {
            return Err(format!(
                "Manifest file not found: {}",
                self.manifest.display()
            ));
        }
        if !self.xml_dir.is_dir() {
            return Err(format!("XML directory not found: {}", self.xml_dir.display()));
        }
        if let Some(workers) = self.max_workers
            && workers == 0
        {
            return Err("Number of workers must be greater than 0".to_string());
        }
        if let Some(limit) = self.limit
            && limit == 0
        {
            return Err("Limit must be greater than 0".to_string());
        }
        Ok(())
    }
}
