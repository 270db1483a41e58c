//! # Bookshelf Server
//!
//! HTTP serving for Bookshelf:
//!
//! - HTTP/1.1 via Hyper, one task per connection
//! - Route table and handlers for the CRUD and demo services
//! - Landing page template and static files
//! - Signal-driven graceful shutdown with a deadline
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bookshelf_core::BookStore;
//! use bookshelf_server::{App, Lifecycle, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::crud(Arc::new(BookStore::new()), "template.html");
//!     let server = Server::new(ServerConfig::default(), app);
//!
//!     Lifecycle::new().run_until_signal(server).await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/bookshelf-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod handlers;
pub mod lifecycle;
pub mod page;
pub mod response;
pub mod server;
pub mod shutdown;
pub mod static_files;

pub use app::{App, PageSource};
pub use config::{ServerConfig, ServerConfigBuilder};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use page::{PageData, PageTemplate, TemplateError};
pub use response::HttpResponse;
pub use server::{BoundServer, Server, ServerError};
pub use shutdown::{wait_for_os_signal, ShutdownSignal};
pub use static_files::{StaticFileError, StaticFiles};
