//! Tracing subscriber setup for client binaries.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "revival.log";

/// Installs the global subscriber.
///
/// Always logs to stderr, filtered by `RUST_LOG` with an `info` floor. When a
/// log directory is available (`log_dir`, else the platform data directory)
/// a daily-rolling file layer is added too. Keep the returned guard alive for
/// the life of the process so buffered lines get flushed.
pub fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir.map(Path::to_path_buf).or_else(default_log_dir) {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some((layer, dir)), Some(guard))
        }
        None => (None, None),
    };

    let log_path = file_layer.as_ref().map(|(_, dir)| dir.join(LOG_FILE_PREFIX));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer.map(|(layer, _)| layer))
        .try_init()
        .context("failed to install tracing subscriber")?;

    match log_path {
        Some(path) => tracing::info!("Log file: {}", path.display()),
        None => tracing::info!("No log directory available; logging to stderr only"),
    }

    Ok(guard)
}

/// Platform-specific data directory for log files.
pub fn default_log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "revival").map(|dirs| dirs.data_local_dir().join("logs"))
}
