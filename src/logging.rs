//! Log output for a command run.
//!
//! Every event goes to stderr and, without colour codes, to a log file.
//! The subscriber is installed as the default for the current thread only
//! and removed again when the returned guard is dropped.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Keeps logging active; flushes the log file on drop
pub struct LogGuard {
    _default: DefaultGuard,
    _worker: WorkerGuard,
}

/// Install stderr and file logging for the lifetime of the guard
pub fn init(log_file: &Path) -> Result<LogGuard> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", log_file.display()))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, worker) = tracing_appender::non_blocking(appender);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        );

    Ok(LogGuard {
        _default: tracing::subscriber::set_default(subscriber),
        _worker: worker,
    })
}
