//! Read-only catalog with a hardcoded listing.

use crate::{Book, BookCatalog, CatalogError, CatalogResult, NewBook};

/// A catalog whose listing is fixed at construction time.
///
/// The demo service serves this catalog from `GET /books`. It is not backed
/// by a [`BookStore`](crate::BookStore), so records created elsewhere never
/// show up here, and every write is rejected with
/// [`CatalogError::ReadOnly`].
#[derive(Debug, Clone, Default)]
pub struct FixedCatalog {
    books: Vec<Book>,
}

impl FixedCatalog {
    /// Creates a catalog that always lists `books`.
    #[must_use]
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    /// The single-record listing served by the demo service.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(vec![Book::new(
            "1",
            "The Rust Programming Language",
            "Steve Klabnik",
        )])
    }
}

impl BookCatalog for FixedCatalog {
    fn list(&self) -> Vec<Book> {
        self.books.clone()
    }

    fn create(&self, _new_book: NewBook) -> CatalogResult<Book> {
        Err(CatalogError::read_only("create"))
    }

    fn update(&self, _id: &str, _replacement: Book) -> CatalogResult<Book> {
        Err(CatalogError::read_only("update"))
    }

    fn delete(&self, _id: &str) -> CatalogResult<()> {
        Err(CatalogError::read_only("delete"))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
