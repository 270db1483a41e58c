//! Top-level error type.

use bookshelf_config::ConfigError;
use bookshelf_server::{ServerError, TemplateError};
use bookshelf_telemetry::TelemetryError;
use thiserror::Error;

use crate::client::ClientError;

/// Any error that ends the process.
#[derive(Debug, Error)]
pub enum BookshelfError {
    /// Configuration could not be loaded or is invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The page template could not be loaded.
    #[error("Failed to parse template: {0}")]
    Template(#[from] TemplateError),

    /// The server failed to start, failed while running, or missed the
    /// shutdown deadline.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Fetching books from a remote endpoint failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Result type for process-level operations.
pub type BookshelfResult<T> = Result<T, BookshelfError>;
