//! Batch extraction over a directory of XML catalogue files
//!
//! Files are processed by a bounded pool: every file becomes a tokio task that
//! first takes a semaphore permit and then parses on the blocking thread pool.
//! Tasks share nothing but read-only inputs, and every outcome stays paired with
//! the file that produced it.

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ConfigManager};
use crate::error::{CatalogueError, Result};
use crate::file_discovery::FileDiscovery;
use crate::processor::{DocumentProcessor, XmlMetadata};

/// Batch configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Number of files processed concurrently
    pub max_workers: usize,
    /// Process at most this many discovered files
    pub limit: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            limit: None,
        }
    }
}

/// Outcome of processing a single file
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<XmlMetadata>,
    pub duration: Duration,
}

/// A file that produced no record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Progress update, emitted as each file completes
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub current_file: PathBuf,
    pub completed: usize,
    pub total: usize,
}

/// Progress callback type for batch updates
pub type ProgressCallback = Arc<dyn Fn(BatchProgress) + Send + Sync>;

/// Aggregated results of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchResults {
    /// Files discovered before the limit was applied
    pub files_found: usize,
    /// Files handed to the processor
    pub files_processed: usize,
    /// Successfully extracted records
    pub records: Vec<XmlMetadata>,
    pub failures: Vec<FileFailure>,
    /// Directory entries discovery could not read
    pub discovery_errors: usize,
    /// Summed per-file processing time
    pub parse_time: Duration,
    pub duration: Duration,
}

impl BatchResults {
    /// Split per-file outcomes into records and failures
    pub fn aggregate(files_found: usize, outcomes: Vec<FileOutcome>, duration: Duration) -> Self {
        let files_processed = outcomes.len();
        let mut records = Vec::with_capacity(files_processed);
        let mut failures = Vec::new();
        let mut parse_time = Duration::ZERO;

        for outcome in outcomes {
            parse_time += outcome.duration;
            match outcome.result {
                Ok(record) => records.push(record),
                Err(e) => failures.push(FileFailure {
                    path: outcome.path,
                    reason: e.to_string(),
                }),
            }
        }

        Self {
            files_found,
            files_processed,
            records,
            failures,
            discovery_errors: 0,
            parse_time,
            duration,
        }
    }

    pub fn files_parsed(&self) -> usize {
        self.records.len()
    }
}

/// Discovers catalogue files and extracts metadata from all of them
pub struct BatchCoordinator {
    discovery: FileDiscovery,
    processor: DocumentProcessor,
    config: BatchConfig,
}

impl BatchCoordinator {
    pub fn new(discovery: FileDiscovery, config: BatchConfig) -> Self {
        Self {
            discovery,
            processor: DocumentProcessor::new(),
            config,
        }
    }

    /// Build discovery and batch settings from the merged configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let discovery = FileDiscovery::new()
            .with_extensions(config.files.extensions.clone())
            .with_include_patterns(config.files.include_patterns.clone())?
            .with_exclude_patterns(config.files.exclude_patterns.clone())?
            .with_max_depth(config.files.max_depth)
            .with_follow_symlinks(config.files.follow_symlinks);

        Ok(Self::new(
            discovery,
            BatchConfig {
                max_workers: ConfigManager::get_worker_count(config),
                limit: config.processing.limit,
            },
        ))
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Discover, process and aggregate every XML file under `directory`
    pub async fn run(&self, directory: &Path) -> Result<BatchResults> {
        self.run_with_progress(directory, None).await
    }

    pub async fn run_with_progress(
        &self,
        directory: &Path,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<BatchResults> {
        let start = Instant::now();
        info!("Searching for XML files in {}", directory.display());

        let discovered = self.discovery.discover(directory).await?;
        let discovery_errors = discovered.errors;
        let mut files = discovered.files;
        let files_found = files.len();
        info!("Found {} XML files", files_found);
        if discovery_errors > 0 {
            warn!("Skipped {} unreadable directory entries", discovery_errors);
        }

        if let Some(limit) = self.config.limit
            && files.len() > limit
        {
            info!("Limiting to {} XML files for processing", limit);
            files.truncate(limit);
        }

        if files.is_empty() {
            warn!("No XML files found to process");
            let mut results = BatchResults::aggregate(files_found, Vec::new(), start.elapsed());
            results.discovery_errors = discovery_errors;
            return Ok(results);
        }

        info!(
            "Processing {} XML files with {} workers",
            files.len(),
            self.config.max_workers
        );
        let outcomes = self.process_files(files, progress_callback).await?;

        for outcome in &outcomes {
            match &outcome.result {
                Err(e) if e.is_per_file() => {
                    warn!(file = %outcome.path.display(), "Error processing XML file: {}", e)
                }
                Err(e) => error!(file = %outcome.path.display(), "Could not read XML file: {}", e),
                Ok(_) => debug!(
                    file = %outcome.path.display(),
                    elapsed_ms = outcome.duration.as_millis() as u64,
                    "Processed XML file"
                ),
            }
        }

        let mut results = BatchResults::aggregate(files_found, outcomes, start.elapsed());
        results.discovery_errors = discovery_errors;
        info!(
            "Successfully processed {} out of {} XML files",
            results.files_parsed(),
            results.files_processed
        );
        Ok(results)
    }

    /// Process a list of files with bounded parallelism
    pub async fn process_files(
        &self,
        files: Vec<PathBuf>,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<Vec<FileOutcome>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let total = files.len();
        let completed = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_workers.max(1)));

        let tasks: Vec<_> = files
            .into_iter()
            .map(|path| {
                let processor = self.processor;
                let semaphore = Arc::clone(&semaphore);
                let completed = Arc::clone(&completed);
                let progress_callback = progress_callback.clone();

                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|_| {
                        CatalogueError::Concurrency {
                            details: "Worker semaphore closed".to_string(),
                        }
                    })?;

                    let started = Instant::now();
                    let task_path = path.clone();
                    let result =
                        tokio::task::spawn_blocking(move || processor.process_file(&task_path))
                            .await
                            .map_err(|e| CatalogueError::Concurrency {
                                details: format!("Join error: {}", e),
                            })?;

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(callback) = &progress_callback {
                        callback(BatchProgress {
                            current_file: path.clone(),
                            completed: done,
                            total,
                        });
                    }

                    Ok::<FileOutcome, CatalogueError>(FileOutcome {
                        path,
                        result,
                        duration: started.elapsed(),
                    })
                })
            })
            .collect();

        let joined = try_join_all(tasks)
            .await
            .map_err(|e| CatalogueError::Concurrency {
                details: format!("Task join error: {}", e),
            })?;

        joined.into_iter().collect()
    }
}
