//! Fire Gateway Logging
//!
//! JSON log files with daily rotation and retention, plus a panic hook that
//! writes a crash report carrying the gateway's context (root, command).

mod panic_hook;
mod logging;

pub use panic_hook::{init_panic_hook, set_crash_context};
pub use logging::{init_logging, cleanup_old_logs, cleanup_logs_in};

use std::path::PathBuf;
use directories::ProjectDirs;

/// Where log files and crash reports go
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "FireShare", "FireGateway")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Install logging and the panic hook
///
/// Keep the returned guard alive until exit so buffered log lines are
/// flushed.
pub fn init() -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let guard = init_logging()?;
    init_panic_hook();
    set_crash_context("version", env!("CARGO_PKG_VERSION"));
    Ok(guard)
}
