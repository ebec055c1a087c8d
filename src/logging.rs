//! Tracing setup: compact stdout logs mirrored into an append-only file.
//!
//! Provider failures are reported to callers with a generic message and logged here in full,
//! so the file layer is installed whenever the configured log file can be opened. When it
//! cannot, the server keeps running with stdout logging only.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;

/// Install the global subscriber.
///
/// `RUST_LOG` drives filtering (default `info`). The returned guard flushes the file writer
/// on drop; hold it for the lifetime of the process.
pub fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match open_log_writer(&config.log_file) {
        Ok((writer, guard)) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .compact();
            (Some(layer), Some(guard))
        }
        Err(error) => {
            eprintln!(
                "Logging to stdout only; cannot open {}: {error}",
                config.log_file.display()
            );
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();

    guard
}

/// Open `path` for appending, creating missing parent directories, behind a non-blocking writer.
fn open_log_writer(path: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    let file = open_append(path)?;
    Ok(tracing_appender::non_blocking(file))
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
