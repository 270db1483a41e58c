//! # Bookshelf
//!
//! An in-memory book catalog served over HTTP, in one of two modes:
//!
//! - **crud**: create, list, update and delete books held in process memory
//! - **demo**: a templated landing page, static assets and a fixed book list
//!
//! This crate wires configuration, logging and the server together and
//! provides the `bookshelf` binary:
//!
//! ```text
//! bookshelf [serve] [--config <PATH>] [--mode crud|demo] [--addr <ADDR>]
//! bookshelf fetch <URL>
//! ```
//!
//! ## Crate Organization
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | `bookshelf-core` | Book model, catalog trait, in-memory store |
//! | `bookshelf-router` | Radix-tree router |
//! | `bookshelf-config` | Layered configuration |
//! | `bookshelf-telemetry` | Logging setup |
//! | `bookshelf-server` | HTTP server, handlers, lifecycle |

#![doc(html_root_url = "https://docs.rs/bookshelf/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod client;
pub mod error;

pub use bootstrap::{build_app, build_server, load_config, log_config, ServeOptions};
pub use client::{fetch_books, BooksClient, ClientError};
pub use error::{BookshelfError, BookshelfResult};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
