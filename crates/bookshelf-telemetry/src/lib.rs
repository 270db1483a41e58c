//! Logging setup for Bookshelf.
//!
//! Bookshelf logs through the `tracing` macros. This crate installs the
//! subscriber that turns those events into lines on standard output or in
//! an append-only log file.
//!
//! ```text
//!  tracing::info!(..) ──► EnvFilter ──► fmt layer (json | pretty | compact)
//!                                              │
//!                                   ┌──────────┴──────────┐
//!                                   ▼                     ▼
//!                                stdout          server.log (append)
//! ```

#![doc(html_root_url = "https://docs.rs/bookshelf-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, make_writer, LogConfig, LogFormat, LogTarget};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
