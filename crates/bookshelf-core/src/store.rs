//! Mutable in-memory book store.

use parking_lot::Mutex;

use crate::{Book, BookCatalog, CatalogError, CatalogResult, NewBook};

/// In-memory catalog backed by an ordered `Vec` and a monotonic counter.
///
/// Ids are the stringified next value of the counter, starting at `"1"`.
/// Deleting a record never rewinds the counter, so ids are never reused.
/// Lookups are linear scans over the records.
///
/// # Thread Safety
///
/// Every operation takes a single mutex for its whole duration, so concurrent
/// requests observe a consistent list and never receive duplicate ids.
///
/// # Example
///
/// ```
/// use bookshelf_core::{Book, BookCatalog, BookStore, NewBook};
///
/// let store = BookStore::new();
/// store.create(NewBook::new("Dune", "Herbert")).unwrap();
///
/// let updated = store
///     .update("1", Book::new("ignored", "Dune Messiah", "Herbert"))
///     .unwrap();
/// assert_eq!(updated.id, "1");
///
/// store.delete("1").unwrap();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct BookStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    books: Vec<Book>,
    next_id: u64,
}

impl BookStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.inner.lock().books.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().books.is_empty()
    }
}

impl BookCatalog for BookStore {
    fn list(&self) -> Vec<Book> {
        self.inner.lock().books.clone()
    }

    fn create(&self, new_book: NewBook) -> CatalogResult<Book> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let book = new_book.into_book(inner.next_id.to_string());
        inner.books.push(book.clone());
        Ok(book)
    }

    fn update(&self, id: &str, replacement: Book) -> CatalogResult<Book> {
        let mut inner = self.inner.lock();
        let slot = inner
            .books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| CatalogError::not_found(id))?;
        *slot = replacement.with_id(id);
        Ok(slot.clone())
    }

    fn delete(&self, id: &str) -> CatalogResult<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(|| CatalogError::not_found(id))?;
        inner.books.remove(index);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "store"
    }
}
