//! Catalog error types.

use http::StatusCode;
use thiserror::Error;

/// Result type alias using [`CatalogError`].
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors returned by [`BookCatalog`](crate::BookCatalog) operations.
///
/// # Example
///
/// ```
/// use bookshelf_core::CatalogError;
/// use http::StatusCode;
///
/// let error = CatalogError::not_found("42");
/// assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
/// assert_eq!(error.client_message(), "Book not found");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No record carries the requested id.
    #[error("book '{id}' not found")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The catalog does not accept writes.
    #[error("catalog is read-only: {operation} rejected")]
    ReadOnly {
        /// The rejected operation.
        operation: &'static str,
    },
}

impl CatalogError {
    /// Creates a not found error for `id`.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a read-only error for `operation`.
    #[must_use]
    pub const fn read_only(operation: &'static str) -> Self {
        Self::ReadOnly { operation }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ReadOnly { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Returns the message sent to HTTP clients.
    #[must_use]
    pub const fn client_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Book not found",
            Self::ReadOnly { .. } => "Catalog is read-only",
        }
    }
}
