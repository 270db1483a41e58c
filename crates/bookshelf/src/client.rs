//! Client for a remote `/books` endpoint.
//!
//! ```rust,ignore
//! let books = bookshelf::client::fetch_books("http://127.0.0.1:8080/books").await?;
//! for book in &books {
//!     println!("{}: {} by {}", book.id, book.title, book.author);
//! }
//! ```

use bookshelf_core::Book;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

/// Errors returned by [`BooksClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read.
    #[error("failed to fetch books: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with something other than `200 OK`.
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// The body is not a JSON array of books.
    #[error("failed to unmarshal books data: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Fetches books from a `/books` endpoint.
#[derive(Debug, Clone, Default)]
pub struct BooksClient {
    client: Client,
}

impl BooksClient {
    /// Creates a client with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client on top of a configured `reqwest` client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GETs `url` and decodes the body as a list of books.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Request` on transport failure,
    /// `ClientError::UnexpectedStatus` for any status but `200`, and
    /// `ClientError::Decode` if the body is not a book list.
    pub async fn fetch(&self, url: &str) -> Result<Vec<Book>, ClientError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let books: Vec<Book> = serde_json::from_slice(&body).map_err(ClientError::Decode)?;
        debug!(url, count = books.len(), "Fetched books");
        Ok(books)
    }
}

/// GETs `url` with a default client. See [`BooksClient::fetch`].
///
/// # Errors
///
/// See [`BooksClient::fetch`].
pub async fn fetch_books(url: &str) -> Result<Vec<Book>, ClientError> {
    BooksClient::new().fetch(url).await
}
