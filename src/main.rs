use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;

use catalogue_match::batch::{BatchCoordinator, BatchProgress, ProgressCallback};
use catalogue_match::cli::{Cli, VerbosityLevel};
use catalogue_match::config::ConfigManager;
use catalogue_match::error_reporter::ErrorReporter;
use catalogue_match::logging::init_logging;
use catalogue_match::output::Output;
use catalogue_match::pipeline::{CatalogueJob, ensure_output_dir, process_catalogue};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_args();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        return Ok(ExitCode::FAILURE);
    }

    let config = match ConfigManager::load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            ErrorReporter::new(VerbosityLevel::Normal).report_config_error(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    init_logging(&config)?;

    let verbosity = config.output.verbosity();
    let reporter =
        ErrorReporter::with_timestamps(verbosity, verbosity == VerbosityLevel::Debug);

    let coordinator = match BatchCoordinator::from_config(&config) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            reporter.report_error(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Err(e) = ensure_output_dir(&cli.output) {
        reporter.report_error(&e);
        return Ok(ExitCode::FAILURE);
    }

    let progress_callback = config.processing.show_progress.then(|| {
        let progress_reporter = ErrorReporter::new(verbosity);
        let callback: ProgressCallback = Arc::new(move |progress: BatchProgress| {
            progress_reporter.report_progress(&progress)
        });
        callback
    });

    let job = CatalogueJob {
        manifest_path: cli.manifest.clone(),
        xml_dir: cli.xml_dir.clone(),
        output_path: cli.output.clone(),
    };
    info!(
        manifest = %job.manifest_path.display(),
        xml_dir = %job.xml_dir.display(),
        output = %job.output_path.display(),
        workers = coordinator.config().max_workers,
        "Starting catalogue run"
    );

    let report = match process_catalogue(&job, &coordinator, progress_callback).await {
        Ok(report) => report,
        Err(e) => {
            reporter.report_error(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let output = Output::new(config.output.format.into(), verbosity);
    print!("{}", output.format_report(&report));

    if report.outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
