//! Configuration schema types.
//!
//! Every section rejects unknown fields and fills missing ones with
//! defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which route set the service exposes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    /// Mutable catalog: `GET /`, `POST /books`, `PUT|DELETE /books/{id}`, `GET /books`.
    #[default]
    Crud,
    /// Templated page, `/static/*` files and a fixed `/books` listing.
    Demo,
}

impl ServiceMode {
    /// Returns the lowercase name used in files and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Crud => "crud",
            Self::Demo => "demo",
        }
    }
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crud" => Ok(Self::Crud),
            "demo" => Ok(Self::Demo),
            other => Err(format!("unknown service mode '{other}', expected 'crud' or 'demo'")),
        }
    }
}

/// Server configuration section.
///
/// # Example
///
/// ```
/// use bookshelf_config::{ServerSection, ServiceMode};
///
/// let server = ServerSection::default();
/// assert_eq!(server.http_addr, "0.0.0.0:8080");
/// assert_eq!(server.shutdown_timeout_secs, 5);
/// assert_eq!(server.mode, ServiceMode::Crud);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// HTTP server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// How long shutdown waits for in-flight requests, in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Route set to expose.
    #[serde(default)]
    pub mode: ServiceMode,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            mode: ServiceMode::default(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    5
}

/// Page and asset settings.
///
/// In CRUD mode `page_path` is served as a raw file. In demo mode it is
/// parsed as a template and rendered with `title`, `heading` and `content`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    /// Page served from `GET /`.
    #[serde(default = "default_page_path")]
    pub page_path: String,

    /// Directory served under `/static/` in demo mode.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Value of `{{.Title}}`.
    #[serde(default = "default_title")]
    pub title: String,

    /// Value of `{{.Heading}}`.
    #[serde(default = "default_heading")]
    pub heading: String,

    /// Value of `{{.Content}}`.
    #[serde(default = "default_content")]
    pub content: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            page_path: default_page_path(),
            static_dir: default_static_dir(),
            title: default_title(),
            heading: default_heading(),
            content: default_content(),
        }
    }
}

fn default_page_path() -> String {
    "template.html".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_title() -> String {
    "Bookshelf Library".to_string()
}

fn default_heading() -> String {
    "Welcome to Bookshelf".to_string()
}

fn default_content() -> String {
    "Your personal library management system.".to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs.
    Json,
    /// Human-readable multi-line format.
    Pretty,
    /// Human-readable single-line format.
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info" or "bookshelf_server=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Append logs to this file instead of standard output.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_mode_from_str() {
        assert_eq!("crud".parse::<ServiceMode>(), Ok(ServiceMode::Crud));
        assert_eq!("DEMO".parse::<ServiceMode>(), Ok(ServiceMode::Demo));
        assert!("static".parse::<ServiceMode>().is_err());
    }

    #[test]
    fn test_service_mode_display() {
        assert_eq!(ServiceMode::Demo.to_string(), "demo");
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let server: ServerSection = toml::from_str("mode = \"demo\"").unwrap();
        assert_eq!(server.mode, ServiceMode::Demo);
        assert_eq!(server.http_addr, "0.0.0.0:8080");
        assert_eq!(server.shutdown_timeout_secs, 5);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = toml::from_str::<SiteSection>("theme = \"dark\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
