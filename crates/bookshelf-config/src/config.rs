//! Root configuration type and presets.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LoggingSection, ServerSection, ServiceMode, SiteSection};

/// Log file used by the demo service when none is configured.
pub const DEMO_LOG_FILE: &str = "server.log";

/// Complete Bookshelf configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use bookshelf_config::BookshelfConfig;
///
/// let config = BookshelfConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.site.page_path, "template.html");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct BookshelfConfig {
    /// Listener, shutdown and mode settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Page and static asset settings.
    #[serde(default)]
    pub site: SiteSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl BookshelfConfig {
    /// Preset for the CRUD service: logs go to standard output.
    #[must_use]
    pub fn crud() -> Self {
        Self::default()
    }

    /// Preset for the demo service: logs are appended to `server.log`.
    ///
    /// # Example
    ///
    /// ```
    /// use bookshelf_config::{BookshelfConfig, ServiceMode};
    ///
    /// let config = BookshelfConfig::demo();
    /// assert_eq!(config.server.mode, ServiceMode::Demo);
    /// assert_eq!(config.logging.file.as_deref(), Some("server.log"));
    /// ```
    #[must_use]
    pub fn demo() -> Self {
        let mut config = Self::default();
        config.server.mode = ServiceMode::Demo;
        config.logging.file = Some(DEMO_LOG_FILE.to_string());
        config
    }

    /// Returns the preset for `mode`.
    #[must_use]
    pub fn preset(mode: ServiceMode) -> Self {
        match mode {
            ServiceMode::Crud => Self::crud(),
            ServiceMode::Demo => Self::demo(),
        }
    }

    /// Fills settings the chosen mode implies but no layer set.
    ///
    /// Demo mode always logs to a file: `server.log` unless
    /// `logging.file` names another one.
    ///
    /// # Example
    ///
    /// ```
    /// use bookshelf_config::{BookshelfConfig, ServiceMode};
    ///
    /// let mut config = BookshelfConfig::crud();
    /// config.server.mode = ServiceMode::Demo;
    /// config.apply_mode_defaults();
    /// assert_eq!(config.logging.file.as_deref(), Some("server.log"));
    /// ```
    pub fn apply_mode_defaults(&mut self) {
        if self.server.mode == ServiceMode::Demo && self.logging.file.is_none() {
            self.logging.file = Some(DEMO_LOG_FILE.to_string());
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `server.http_addr` is not a socket address
    /// - `server.shutdown_timeout_secs` is zero
    /// - `logging.level` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.shutdown_timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        Ok(())
    }

    /// Parses `server.http_addr`.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.http_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            )
        })
    }
}
