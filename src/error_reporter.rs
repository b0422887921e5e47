use crate::batch::BatchProgress;
use crate::cli::VerbosityLevel;
use crate::config::ConfigError;
use crate::error::CatalogueError;

/// Error reporter with configurable verbosity
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
    show_timestamps: bool,
}

impl ErrorReporter {
    /// Create a new error reporter with specified verbosity
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_timestamps: false,
        }
    }

    /// Create a new error reporter that prefixes messages with the time
    pub fn with_timestamps(verbosity: VerbosityLevel, show_timestamps: bool) -> Self {
        Self {
            verbosity,
            show_timestamps,
        }
    }

    /// Report a fatal run error with appropriate verbosity
    pub fn report_error(&self, error: &CatalogueError) {
        eprintln!("{}", self.format_error(error));
    }

    /// Report a configuration error
    pub fn report_config_error(&self, error: &ConfigError) {
        let formatted = match self.verbosity {
            VerbosityLevel::Quiet => format!("Config error: {}", error),
            VerbosityLevel::Normal | VerbosityLevel::Verbose => {
                format!("Configuration Error: {}\n{}", error, config_help(error))
            }
            VerbosityLevel::Debug => {
                format!(
                    "Configuration Error: {}\nDebug: {:?}\n{}",
                    error,
                    error,
                    config_help(error)
                )
            }
        };
        eprintln!("{}", formatted);
    }

    /// Report progress for the batch run
    pub fn report_progress(&self, progress: &BatchProgress) {
        if self.verbosity == VerbosityLevel::Quiet || progress.total == 0 {
            return;
        }

        let percentage = (progress.completed as f64 / progress.total as f64 * 100.0) as u32;

        match self.verbosity {
            VerbosityLevel::Verbose | VerbosityLevel::Debug => {
                eprint!(
                    "\rProgress: {}/{} ({}%) - Processed: {}",
                    progress.completed,
                    progress.total,
                    percentage,
                    progress.current_file.display()
                );
            }
            _ => {
                eprint!(
                    "\rProgress: {}/{} ({}%)",
                    progress.completed, progress.total, percentage
                );
            }
        }

        if progress.completed == progress.total {
            eprintln!();
        }
    }

    pub fn format_error(&self, error: &CatalogueError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("ERROR: {}", error),
            VerbosityLevel::Normal => self.format_error_normal(error),
            VerbosityLevel::Verbose => self.format_error_verbose(error),
            VerbosityLevel::Debug => self.format_error_debug(error),
        }
    }

    fn format_error_normal(&self, error: &CatalogueError) -> String {
        let timestamp = if self.show_timestamps {
            format!("[{}] ", chrono::Utc::now().format("%H:%M:%S"))
        } else {
            String::new()
        };

        let mut output = format!("{}Error: {}", timestamp, error);
        if let Some(hint) = remediation(error) {
            output.push_str(&format!("\nSuggestion: {}", hint));
        }
        output
    }

    fn format_error_verbose(&self, error: &CatalogueError) -> String {
        let mut output = self.format_error_normal(error);

        match error {
            CatalogueError::UnsupportedFormat { path, .. } => {
                output.push_str(&format!("\nFile: {}", path.display()));
            }
            CatalogueError::InvalidManifest { path, details } => {
                output.push_str(&format!("\nFile: {}", path.display()));
                output.push_str(&format!("\nDetails: {}", details));
            }
            CatalogueError::XmlParse { file, details } => {
                output.push_str(&format!("\nFile: {}", file.display()));
                output.push_str(&format!("\nDetails: {}", details));
            }
            CatalogueError::FileSystemTraversal { path, reason } => {
                output.push_str(&format!("\nPath: {}", path.display()));
                output.push_str(&format!("\nReason: {}", reason));
            }
            _ => {}
        }

        output
    }

    fn format_error_debug(&self, error: &CatalogueError) -> String {
        let mut output = self.format_error_verbose(error);
        output.push_str(&format!("\nDebug Info: {:?}", error));

        output.push_str("\nError Chain:");
        let mut current_error: &dyn std::error::Error = error;
        let mut level = 0;
        while let Some(source) = current_error.source() {
            output.push_str(&format!("\n  {}: {}", level + 1, source));
            current_error = source;
            level += 1;
        }

        output
    }
}

fn remediation(error: &CatalogueError) -> Option<&'static str> {
    let hint = match error {
        CatalogueError::UnsupportedFormat { .. } => {
            "Use a manifest with a .csv, .json, .xlsx or .xls extension"
        }
        CatalogueError::InvalidManifest { .. } => {
            "JSON manifests must be an array of objects or an object of objects"
        }
        CatalogueError::Json(_) => "Check the JSON manifest is well formed",
        CatalogueError::Csv(_) => "Check the manifest has a header row and consistent quoting",
        CatalogueError::ExcelRead(_) => {
            "Check the workbook is not password protected or corrupt"
        }
        CatalogueError::ExcelWrite(_) => "Check the output path is writable and not open elsewhere",
        CatalogueError::Io(_) => "Check the path exists and is readable/writable",
        CatalogueError::FileSystemTraversal { .. } => {
            "Check permissions on the XML directory and its subdirectories"
        }
        CatalogueError::Config(_) => "Check the configuration file, environment and arguments",
        CatalogueError::XmlParse { .. }
        | CatalogueError::MissingIdentifier { .. }
        | CatalogueError::Concurrency { .. } => return None,
    };
    Some(hint)
}

fn config_help(error: &ConfigError) -> &'static str {
    match error {
        ConfigError::Io(_) => "Check the configuration file path exists and is readable",
        ConfigError::TomlParsing(_) | ConfigError::JsonParsing(_) => {
            "Check the configuration file syntax (TOML/JSON format expected)"
        }
        ConfigError::UnsupportedFormat(_) => "Configuration files must end in .toml or .json",
        ConfigError::Environment(_) => "Fix or unset the CATALOGUE_MATCH_* environment variable",
        ConfigError::Validation(_) => {
            "Resolve conflicting or out-of-range values between file, environment, and CLI"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_quiet_format_is_one_line() {
        let reporter = ErrorReporter::new(VerbosityLevel::Quiet);
        let error = CatalogueError::UnsupportedFormat {
            path: PathBuf::from("manifest.parquet"),
            extension: ".parquet".to_string(),
        };

        let formatted = reporter.format_error(&error);
        assert!(formatted.starts_with("ERROR:"));
        assert!(!formatted.contains('\n'));
    }

    #[test]
    fn test_verbose_format_adds_suggestion() {
        let reporter = ErrorReporter::new(VerbosityLevel::Verbose);
        let error = CatalogueError::UnsupportedFormat {
            path: PathBuf::from("manifest.parquet"),
            extension: ".parquet".to_string(),
        };

        let formatted = reporter.format_error(&error);
        assert!(formatted.contains("Suggestion:"));
        assert!(formatted.contains(".xlsx"));
    }

    #[test]
    fn test_normal_format_includes_hint() {
        let reporter = ErrorReporter::new(VerbosityLevel::Normal);
        let error = CatalogueError::InvalidManifest {
            path: PathBuf::from("manifest.json"),
            details: "top-level number".to_string(),
        };

        let formatted = reporter.format_error(&error);
        assert!(formatted.starts_with("Error: Invalid manifest"));
        assert!(formatted.contains("Suggestion: JSON manifests must be"));
        assert!(!formatted.contains("Details:"));
    }

    #[test]
    fn test_debug_format_includes_error_chain() {
        let reporter = ErrorReporter::new(VerbosityLevel::Debug);
        let error = CatalogueError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "manifest missing",
        ));

        let formatted = reporter.format_error(&error);
        assert!(formatted.contains("Debug Info:"));
        assert!(formatted.contains("1: manifest missing"));
    }

    #[test]
    fn test_timestamps_prefix_normal_output() {
        let reporter = ErrorReporter::with_timestamps(VerbosityLevel::Normal, true);
        let error = CatalogueError::Config("bad".to_string());

        assert!(reporter.format_error(&error).starts_with('['));
    }
}
