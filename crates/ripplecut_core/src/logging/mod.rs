//! Logging infrastructure.
//!
//! This module provides:
//! - Global `tracing` setup (stderr, optional non-blocking log file)
//! - Per-operation [`EditLogger`]s with file + host callback output
//! - Modal notifications for the host editor
//! - Tail buffer for error reports
//!
//! # Example
//!
//! ```no_run
//! use ripplecut_core::logging::{EditLoggerBuilder, LogLevel};
//!
//! let logger = EditLoggerBuilder::new("collapse")
//!     .log_dir("/tmp/ripplecut-logs")
//!     .level(LogLevel::Debug)
//!     .build()
//!     .unwrap();
//!
//! logger.phase("Collapse and fold");
//! logger.success("12 clips packed");
//! ```

mod edit_logger;
mod types;

use std::path::Path;

pub use edit_logger::{EditLogger, EditLoggerBuilder};
pub use types::{HostLogCallback, LogConfig, LogLevel, MessagePrefix, NotifyCallback};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name used by [`init_file_tracing`].
pub const LOG_FILE_NAME: &str = "ripplecut.log";

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`, falling back to `default_level`. Should be called
/// once at host startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Initialize tracing to stderr plus a non-blocking file in `log_dir`.
///
/// Keep the returned guard alive for as long as logging should reach the
/// file; dropping it flushes pending lines.
pub fn init_file_tracing(log_dir: impl AsRef<Path>, default_level: LogLevel) -> std::io::Result<WorkerGuard> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter)
        .try_init();

    Ok(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(level_to_filter_str(LogLevel::Debug), "debug");
        assert_eq!(level_to_filter_str(LogLevel::Info), "info");
        assert_eq!(level_to_filter_str(LogLevel::Trace), "trace");
    }

    #[test]
    fn file_tracing_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let guard = init_file_tracing(&log_dir, LogLevel::Info).unwrap();
        tracing::info!("file tracing ready");
        assert!(log_dir.join(LOG_FILE_NAME).is_file());
        drop(guard);
    }

    #[test]
    fn test_tracing_can_be_called_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
