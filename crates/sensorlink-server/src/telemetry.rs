//! Logging initialisation.
//!
//! Call [`init_logging`] once at process startup.  The configured level
//! seeds the filter; `RUST_LOG` overrides it when set.  When a log file is
//! configured, a non-blocking daily-rolling file sink runs alongside the
//! console output, keeping `logging.backup_count` rotated files.
//!
//! The core never holds a reference to the sink – logging is ambient via the
//! `tracing` macros.
//!
//! # Example
//!
//! ```rust,no_run
//! use sensorlink_server::config::Config;
//!
//! let config = Config::default();
//! // Hold the guard for the entire lifetime of the process.
//! let _guard = sensorlink_server::telemetry::init_logging(&config.logging);
//! ```

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// RAII guard for the non-blocking file sink.
///
/// Dropping it flushes buffered log lines, so hold an instance in `main` for
/// the entire program lifetime.  Holds nothing when logging is console-only.
pub struct LogGuard(Option<WorkerGuard>);

/// Initialise the global `tracing` subscriber.
///
/// Must be called at most once per process; the returned [`LogGuard`] keeps
/// the file sink's writer thread alive.
pub fn init_logging(config: &LoggingConfig) -> LogGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

    match file_writer(config) {
        Some((writer, guard)) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            LogGuard(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact())
                .init();
            LogGuard(None)
        }
    }
}

/// Build the rolling file writer when `logging.file` is set.
///
/// Returns `None` when no file is configured or the appender cannot be
/// created (the error is printed to stderr and the caller falls back to
/// console-only logging).
fn file_writer(config: &LoggingConfig) -> Option<(NonBlocking, WorkerGuard)> {
    let file = config.file.as_deref()?;
    let path = Path::new(file);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sensorlink.log".to_string());

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(name)
        .max_log_files(config.backup_count.max(1))
        .build(dir)
        .map_err(|e| eprintln!("[sensorlink] log file sink init failed: {e}"))
        .ok()?;

    Some(tracing_appender::non_blocking(appender))
}
