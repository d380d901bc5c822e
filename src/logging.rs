//! Tracing setup.
//!
//! The terminal belongs to the UI, so logs go to a daily rolling file under
//! the local data directory. `RUST_LOG` overrides the default filter, e.g.
//! `RUST_LOG=procura=debug` or `RUST_LOG=procura::table=trace`.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILTER: &str = "procura=info,warn";

const LOG_FILE_PREFIX: &str = "procura.log";

/// Install the global subscriber.
///
/// Fails when the log directory cannot be created or a subscriber is
/// already set.
pub fn init() -> anyhow::Result<()> {
    let log_dir = log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "procura starting");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");
    Ok(())
}

/// `<data_local_dir>/procura/logs`.
pub fn log_directory() -> anyhow::Result<PathBuf> {
    let base = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;
    Ok(base.join("procura").join("logs"))
}

pub fn shutdown() {
    tracing::info!("procura shutting down");
}
