//! Logging initialisation.
//!
//! All diagnostics in this crate go through `tracing`; this module wires a
//! subscriber for binaries that host an activity. Output goes to stderr,
//! and optionally to a non-blocking log file inside the activity's writable
//! directory (the platform-log-line equivalent of the original shim).
//!
//! # Example
//!
//! ```ignore
//! use appglue::log::{init_logging, LogConfig};
//!
//! let _guard = init_logging(LogConfig::new().with_file_dir(writable_dir));
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// File name used for the optional log file.
const LOG_FILE_NAME: &str = "appglue.log";

/// Logging configuration.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub filter: String,

    /// Directory for the optional log file; `None` disables file output.
    pub file_dir: Option<PathBuf>,
}

impl LogConfig {
    /// Creates a config with the default `info` filter and no file output.
    pub fn new() -> Self {
        Self {
            filter: "info".to_string(),
            file_dir: None,
        }
    }

    /// Sets the default filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enables file output in the given directory.
    pub fn with_file_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file_dir = Some(dir.into());
        self
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the non-blocking file writer flushing.
///
/// Hold this for the lifetime of the process; dropping it flushes and stops
/// the background writer.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured filter. Safe to call more than once;
/// later calls leave the existing subscriber in place.
pub fn init_logging(config: LogConfig) -> LogGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    match config.file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .try_init();

            LogGuard {
                _file_guard: Some(guard),
            }
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init();

            LogGuard { _file_guard: None }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
