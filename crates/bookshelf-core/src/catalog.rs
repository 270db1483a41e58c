//! The catalog abstraction.

use crate::{Book, CatalogResult, NewBook};

/// A source of book records.
///
/// Handlers receive an `Arc<dyn BookCatalog>` from the application state and
/// never reach for a global. Implementations must be safe to share across
/// request tasks.
///
/// # Example
///
/// ```
/// use bookshelf_core::{BookCatalog, BookStore, FixedCatalog, NewBook};
/// use std::sync::Arc;
///
/// let catalogs: Vec<Arc<dyn BookCatalog>> = vec![
///     Arc::new(BookStore::new()),
///     Arc::new(FixedCatalog::demo()),
/// ];
///
/// assert!(catalogs[0].create(NewBook::new("Dune", "Herbert")).is_ok());
/// assert!(catalogs[1].create(NewBook::new("Dune", "Herbert")).is_err());
/// ```
pub trait BookCatalog: Send + Sync {
    /// Returns every record, in insertion order.
    fn list(&self) -> Vec<Book>;

    /// Appends a record and returns it with its assigned id.
    fn create(&self, new_book: NewBook) -> CatalogResult<Book>;

    /// Replaces the first record whose id equals `id`.
    ///
    /// Every field comes from `replacement` except the id, which stays `id`.
    fn update(&self, id: &str, replacement: Book) -> CatalogResult<Book>;

    /// Removes the first record whose id equals `id`.
    fn delete(&self, id: &str) -> CatalogResult<()>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
