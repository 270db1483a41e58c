//! Structured logging setup.
//!
//! Installs a single `tracing-subscriber` formatting layer writing either to
//! standard output or to an append-only file.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookshelf_telemetry::{init_logging, LogConfig, LogTarget};
//!
//! let config = LogConfig::default().with_target(LogTarget::file("server.log"));
//! init_logging(&config)?;
//!
//! tracing::info!(addr = "0.0.0.0:8080", "Server starting");
//! ```

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Multi-line, human-readable.
    Pretty,
    /// Single-line, human-readable.
    #[default]
    Compact,
}

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Standard output.
    #[default]
    Stdout,
    /// A file opened in append mode, created if missing.
    File(PathBuf),
}

impl LogTarget {
    /// Creates a file target.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "bookshelf_server=debug").
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Output destination.
    pub target: LogTarget,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            file_line_info: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Sets the output destination.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }
}

/// Initializes the global logging subscriber.
///
/// ANSI colors are only emitted to standard output.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a
/// subscriber is already installed, and `TelemetryError::LogFile` if the
/// log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;
    let writer = make_writer(&config.target)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(config.target == LogTarget::Stdout)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_target(config.include_target);

    let layer = match config.format {
        LogFormat::Json => fmt_layer.json().with_filter(filter).boxed(),
        LogFormat::Pretty => fmt_layer.pretty().with_filter(filter).boxed(),
        LogFormat::Compact => fmt_layer.compact().with_filter(filter).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Creates an env filter from a string.
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

/// Builds the writer for `target`, opening the log file if needed.
///
/// # Errors
///
/// Returns `TelemetryError::LogFile` if the file cannot be opened.
pub fn make_writer(target: &LogTarget) -> TelemetryResult<BoxMakeWriter> {
    match target {
        LogTarget::Stdout => Ok(BoxMakeWriter::new(std::io::stdout)),
        LogTarget::File(path) => Ok(BoxMakeWriter::new(Mutex::new(open_log_file(path)?))),
    }
}

fn open_log_file(path: &Path) -> TelemetryResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TelemetryError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}
