//! Typed configuration for Bookshelf.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`BOOKSHELF__SECTION__KEY`)
//! - `.env` loading
//! - Strict parsing (unknown fields are rejected)
//! - Presets for the two service modes
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 5
//! mode = "demo"
//!
//! [site]
//! page_path = "template.html"
//! static_dir = "static"
//! title = "Bookshelf Library"
//! heading = "Welcome to Bookshelf"
//! content = "Your personal library management system."
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! file = "server.log"
//! ```
//!
//! # Example
//!
//! ```
//! use bookshelf_config::{ConfigLoader, ServiceMode};
//!
//! let config = ConfigLoader::new()
//!     .with_string("[server]\nmode = \"demo\"", "toml")
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! assert_eq!(config.server.mode, ServiceMode::Demo);
//! ```

#![doc(html_root_url = "https://docs.rs/bookshelf-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{BookshelfConfig, DEMO_LOG_FILE};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingSection, ServerSection, ServiceMode, SiteSection};
