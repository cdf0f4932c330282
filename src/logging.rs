//! File logging setup
//!
//! The engine only emits `tracing` events. A host application calls [`init`]
//! once to send them to a log file; without it the events are discarded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_DIRECTIVE: &str = "blockfall=debug";

/// Default directory for log files
pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join("blockfall")
}

/// Install a global subscriber writing to `dir/file_name`.
///
/// Keep the returned guard alive for as long as logs should be flushed.
/// If a global subscriber is already installed, it is left in place.
pub fn init(dir: &Path, file_name: &str) -> io::Result<WorkerGuard> {
    fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let installed = tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .try_init();
    if installed.is_ok() {
        tracing::info!("logging to {}", dir.join(file_name).display());
    }
    Ok(guard)
}
