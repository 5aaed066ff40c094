//! Tracing subscriber setup
//!
//! Settings come from [`LogConfig`], so hosts and tests pick the filter and
//! the optional rolling file without going through the process environment.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

const LOG_FILE_PREFIX: &str = "tango-recall.log";

/// Keeps the background file writer alive; drop it on shutdown to flush.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn file_writer(dir: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global tracing subscriber.
///
/// Returns a guard only when this call installed a file layer. If a
/// subscriber is already in place it is kept and `None` is returned.
pub fn init_tracing(config: &LogConfig) -> Option<FileLogGuard> {
    let (file_layer, guard) = match config.file_directory().map(file_writer) {
        Some(Ok((writer, guard))) => {
            let layer = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);
            (Some(layer), Some(guard))
        }
        Some(Err(err)) => {
            eprintln!("failed to open log directory {}: {}", config.log_dir.display(), err);
            (None, None)
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("tracing subscriber already installed");
        return None;
    }
    guard.map(|guard| FileLogGuard { _guard: guard })
}
