//! End-to-end run: load the manifest, extract XML metadata, merge, save.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::batch::{BatchCoordinator, FileFailure, ProgressCallback};
use crate::error::{CatalogueError, Result};
use crate::manifest::{Manifest, ManifestShape};
use crate::persistence::{load_manifest, save_manifest};
use crate::processor::XmlMetadata;
use crate::record_index::ManifestHandler;

/// Inputs of one catalogue run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueJob {
    pub manifest_path: PathBuf,
    pub xml_dir: PathBuf,
    pub output_path: PathBuf,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The merged manifest was written
    Completed,
    /// No XML file yielded a record, nothing was written
    NoMetadata,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Summary of a catalogue run
#[derive(Debug, Clone, Serialize)]
pub struct CatalogueReport {
    pub manifest_path: PathBuf,
    pub xml_dir: PathBuf,
    /// Where the merged manifest was written, if it was
    pub output_path: Option<PathBuf>,
    pub files_found: usize,
    pub files_processed: usize,
    pub files_parsed: usize,
    pub failures: Vec<FileFailure>,
    /// Directory entries that could not be read during discovery
    pub discovery_errors: usize,
    pub records_matched: usize,
    pub records_unmatched: usize,
    pub rows_updated: usize,
    pub manifest_shape: ManifestShape,
    pub path_field: Option<String>,
    #[serde(rename = "parse_time_secs", serialize_with = "as_secs")]
    pub parse_time: Duration,
    #[serde(rename = "duration_secs", serialize_with = "as_secs")]
    pub duration: Duration,
    pub completed_at: DateTime<Utc>,
    pub outcome: RunOutcome,
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Run the whole catalogue flow for `job`.
///
/// Per-file XML problems end up in the report. Manifest load and save
/// failures abort the run.
pub async fn process_catalogue(
    job: &CatalogueJob,
    coordinator: &BatchCoordinator,
    progress_callback: Option<ProgressCallback>,
) -> Result<CatalogueReport> {
    let start = Instant::now();

    let manifest = run_blocking({
        let path = job.manifest_path.clone();
        move || load_manifest(&path)
    })
    .await?;
    let manifest_shape = manifest.shape();
    let mut handler = ManifestHandler::new(manifest);
    let path_field = handler.index().path_field().map(str::to_string);

    let batch = coordinator
        .run_with_progress(&job.xml_dir, progress_callback)
        .await?;

    let mut report = CatalogueReport {
        manifest_path: job.manifest_path.clone(),
        xml_dir: job.xml_dir.clone(),
        output_path: None,
        files_found: batch.files_found,
        files_processed: batch.files_processed,
        files_parsed: batch.files_parsed(),
        failures: batch.failures,
        discovery_errors: batch.discovery_errors,
        records_matched: 0,
        records_unmatched: 0,
        rows_updated: 0,
        manifest_shape,
        path_field,
        parse_time: batch.parse_time,
        duration: Duration::ZERO,
        completed_at: Utc::now(),
        outcome: RunOutcome::NoMetadata,
    };

    if batch.records.is_empty() {
        warn!("No XML metadata extracted, nothing to write");
        return Ok(finish(report, start));
    }

    let matched = match_records(&handler, batch.records);
    report.records_matched = matched.len();
    report.records_unmatched = report.files_parsed - matched.len();
    if matched.is_empty() {
        warn!("No matching manifest entries found for any XML file");
    }

    report.rows_updated = handler.apply(&matched).updated;

    let manifest = handler.into_manifest();
    let saved = save_blocking(manifest, job.output_path.clone()).await?;
    report.output_path = Some(saved);
    report.outcome = RunOutcome::Completed;

    Ok(finish(report, start))
}

/// Keep the records that resolve to a manifest entry
fn match_records(handler: &ManifestHandler, records: Vec<XmlMetadata>) -> Vec<XmlMetadata> {
    let total = records.len();
    let matched: Vec<_> = records
        .into_iter()
        .filter(|record| {
            let found = handler.resolve(&record.audio_filename).is_some();
            if !found {
                debug!(
                    audio_filename = %record.audio_filename,
                    source = %record.source_path.display(),
                    "No manifest entry for audio file"
                );
            }
            found
        })
        .collect();

    info!(
        "Matched {} of {} XML records to manifest entries ({} unmatched)",
        matched.len(),
        total,
        total - matched.len()
    );
    matched
}

fn finish(mut report: CatalogueReport, start: Instant) -> CatalogueReport {
    report.duration = start.elapsed();
    report.completed_at = Utc::now();
    info!(
        "Processing completed in {:.2} seconds",
        report.duration.as_secs_f64()
    );
    report
}

async fn save_blocking(manifest: Manifest, path: PathBuf) -> Result<PathBuf> {
    run_blocking(move || save_manifest(&manifest, &path)).await
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| CatalogueError::Concurrency {
            details: format!("Join error: {}", e),
        })?
}

/// Create the directory the output file will be written into
pub fn ensure_output_dir(output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        info!("Creating output directory {}", parent.display());
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
