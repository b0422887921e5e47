//! Tracing setup: stderr console output plus an optional plain-text log file.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

/// Level used when `RUST_LOG` is not set
pub fn default_level(config: &Config) -> &'static str {
    if config.output.verbose || config.output.debug {
        "debug"
    } else if config.output.quiet {
        "warn"
    } else {
        "info"
    }
}

fn create_env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|err| {
        if let Ok(rust_log) = std::env::var("RUST_LOG")
            && !rust_log.is_empty()
        {
            eprintln!(
                "Failed to parse RUST_LOG environment variable '{}': {}",
                rust_log, err
            );
        }
        EnvFilter::new(default_level(config))
    })
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber
pub fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(create_env_filter(config))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    Ok(())
}
