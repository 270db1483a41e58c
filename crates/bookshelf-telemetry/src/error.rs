//! Telemetry error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The log file could not be opened for appending.
    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
