//! # Bookshelf Core
//!
//! Core types and traits for the Bookshelf catalog service.
//!
//! This crate provides the domain layer shared by every other Bookshelf crate:
//!
//! - [`Book`] - A catalog record (`id`, `title`, `author`)
//! - [`NewBook`] - The fields supplied when creating a record
//! - [`BookCatalog`] - The catalog abstraction handlers talk to
//! - [`BookStore`] - Mutable in-memory catalog with a monotonic id counter
//! - [`FixedCatalog`] - Read-only catalog with a hardcoded listing
//! - [`CatalogError`] - Errors returned by catalog operations
//!
//! # Example
//!
//! ```
//! use bookshelf_core::{BookCatalog, BookStore, NewBook};
//!
//! let store = BookStore::new();
//! let book = store.create(NewBook::new("Dune", "Herbert")).unwrap();
//!
//! assert_eq!(book.id, "1");
//! assert_eq!(store.list(), vec![book]);
//! ```

#![doc(html_root_url = "https://docs.rs/bookshelf-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod book;
mod catalog;
mod error;
mod fixed;
mod store;

pub use book::{Book, NewBook};
pub use catalog::BookCatalog;
pub use error::{CatalogError, CatalogResult};
pub use fixed::FixedCatalog;
pub use store::BookStore;
