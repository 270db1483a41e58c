//! Book records.

use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A single catalog record.
///
/// Every field is a string. The `id` is assigned by the store when the
/// record is created and never changes afterwards.
///
/// Decoding is lenient: keys match field names case-insensitively, missing
/// or `null` fields are left empty, unknown fields are ignored and a repeated
/// key keeps its last value. So `{"Title":"Dune"}` decodes to a book with an
/// empty `id` and `author`.
///
/// # Example
///
/// ```
/// use bookshelf_core::Book;
///
/// let book: Book = serde_json::from_str(r#"{"Title":"Dune","extra":1}"#).unwrap();
/// assert_eq!(book.title, "Dune");
/// assert_eq!(book.author, "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Book {
    /// Store-assigned identifier (stringified counter value).
    pub id: String,
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
}

impl Book {
    /// Creates a book with every field supplied.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
        }
    }

    /// Returns this record with its id replaced.
    #[must_use]
    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self
        }
    }
}

impl<'de> Deserialize<'de> for Book {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BookVisitor)
    }
}

struct BookVisitor;

impl<'de> Visitor<'de> for BookVisitor {
    type Value = Book;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a book object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Book, A::Error> {
        let mut book = Book::default();
        while let Some(key) = map.next_key::<String>()? {
            let slot = if key.eq_ignore_ascii_case("id") {
                &mut book.id
            } else if key.eq_ignore_ascii_case("title") {
                &mut book.title
            } else if key.eq_ignore_ascii_case("author") {
                &mut book.author
            } else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };
            if let Some(value) = map.next_value::<Option<String>>()? {
                *slot = value;
            }
        }
        Ok(book)
    }
}

/// Fields supplied when creating a book.
///
/// Empty strings are accepted; the catalog performs no validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
}

impl NewBook {
    /// Creates a new record description.
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }

    pub(crate) fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
        }
    }
}
