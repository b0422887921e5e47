//! Run report rendering
//!
//! Formats a [`CatalogueReport`] as human-readable text, JSON, or a one-line
//! summary.

use std::time::Duration;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::pipeline::{CatalogueReport, RunOutcome};

/// Output formatter for run reports
pub struct Output {
    format: OutputFormat,
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbosity: VerbosityLevel) -> Self {
        Self {
            format,
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    /// Disable ANSI colors regardless of the terminal
    pub fn without_colors(mut self) -> Self {
        self.show_colors = false;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_report(&self, report: &CatalogueReport) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(report),
            OutputFormat::Json => format_json(report),
            OutputFormat::Summary => format_summary_line(report),
        }
    }

    fn format_human(&self, report: &CatalogueReport) -> String {
        let mut output = String::new();

        if self.verbosity == VerbosityLevel::Quiet {
            if !report.outcome.is_success() {
                output.push_str("No XML metadata extracted; no output written\n");
            } else if !report.failures.is_empty() {
                output.push_str(&format!("Failed files: {}\n", report.failures.len()));
            }
            return output;
        }

        output.push_str("Catalogue Summary:\n");
        output.push_str(&format!(
            "  Manifest: {} ({})\n",
            report.manifest_path.display(),
            report.manifest_shape
        ));
        match &report.path_field {
            Some(field) => output.push_str(&format!("  Path field: {}\n", field)),
            None => output.push_str(&format!(
                "  {} none found\n",
                self.colorize("Path field:", "33")
            )),
        }
        output.push_str(&format!("  XML files found: {}\n", report.files_found));
        if report.discovery_errors > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Unreadable entries skipped:", "33"),
                report.discovery_errors
            ));
        }
        output.push_str(&format!("  XML files processed: {}\n", report.files_processed));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Parsed:", "32"),
            report.files_parsed
        ));
        if !report.failures.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Failed:", "31"),
                report.failures.len()
            ));
        }
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Matched:", "32"),
            report.records_matched
        ));
        if report.records_unmatched > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Unmatched:", "33"),
                report.records_unmatched
            ));
        }
        output.push_str(&format!("  Rows updated: {}\n", report.rows_updated));
        output.push_str(&format!("  Duration: {}\n", format_duration(report.duration)));

        match (&report.outcome, &report.output_path) {
            (RunOutcome::Completed, Some(path)) => {
                output.push_str(&format!("  Output: {}\n", path.display()));
            }
            _ => {
                output.push_str(&format!(
                    "  {}\n",
                    self.colorize("No XML metadata extracted; no output written", "31")
                ));
            }
        }

        if self.verbosity >= VerbosityLevel::Verbose && !report.failures.is_empty() {
            output.push_str("\nFailed files:\n");
            for failure in &report.failures {
                output.push_str(&format!(
                    "{}  {} - {}\n",
                    self.colorize("✗", "31"),
                    failure.path.display(),
                    failure.reason
                ));
            }
        }

        if self.verbosity == VerbosityLevel::Debug {
            output.push_str(&format!(
                "\nParse time: {} across {} files\n",
                format_duration(report.parse_time),
                report.files_processed
            ));
            output.push_str(&format!(
                "Completed at: {}\n",
                report.completed_at.to_rfc3339()
            ));
        }

        output
    }
}

fn format_json(report: &CatalogueReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn format_summary_line(report: &CatalogueReport) -> String {
    format!(
        "found={} processed={} parsed={} failed={} matched={} unmatched={} updated={} outcome={}\n",
        report.files_found,
        report.files_processed,
        report.files_parsed,
        report.failures.len(),
        report.records_matched,
        report.records_unmatched,
        report.rows_updated,
        match report.outcome {
            RunOutcome::Completed => "completed",
            RunOutcome::NoMetadata => "no_metadata",
        }
    )
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
