//! Configuration loader with layered approach.

use std::env;
use std::fs;
use std::path::Path;

use crate::{BookshelfConfig, ConfigError, ServiceMode};

/// Configuration loader with layered approach.
///
/// Layers apply in order, later ones overriding earlier ones:
/// 1. Defaults or a mode preset
/// 2. Configuration file (TOML or JSON, replaces the whole config)
/// 3. Environment variables `PREFIX__SECTION__KEY`
///
/// Mode defaults (the demo log file) are filled once every layer has
/// applied, so selecting demo mode from a file or the environment behaves
/// like the demo preset.
///
/// # Example
///
/// ```no_run
/// use bookshelf_config::{ConfigLoader, ServiceMode};
///
/// # fn main() -> Result<(), bookshelf_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_preset(ServiceMode::Demo)
///     .with_file("bookshelf.toml")?
///     .with_dotenv()?
///     .with_env_prefix("BOOKSHELF")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: BookshelfConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BookshelfConfig::default(),
            env_prefix: None,
        }
    }

    /// Start from the preset for `mode`.
    ///
    /// # Example
    ///
    /// ```
    /// use bookshelf_config::{ConfigLoader, ServiceMode};
    ///
    /// let config = ConfigLoader::new()
    ///     .with_preset(ServiceMode::Demo)
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.file.as_deref(), Some("server.log"));
    /// ```
    #[must_use]
    pub fn with_preset(mut self, mode: ServiceMode) -> Self {
        self.config = BookshelfConfig::preset(mode);
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension (`.toml` or `.json`). Fields absent
    /// from the file take their defaults, not the values of earlier layers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a string in the given format ("toml" or "json").
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use bookshelf_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [server]
    ///     http_addr = "127.0.0.1:3000"
    ///     shutdown_timeout_secs = 10
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// assert_eq!(config.server.shutdown_timeout_secs, 10);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// With prefix "BOOKSHELF":
    /// - `BOOKSHELF__SERVER__HTTP_ADDR=127.0.0.1:9000`
    /// - `BOOKSHELF__SERVER__MODE=demo`
    /// - `BOOKSHELF__LOGGING__FILE=/var/log/bookshelf.log`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the working directory into the environment.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvError` if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply environment overrides and mode defaults, then validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation
    /// fails.
    pub fn load(mut self) -> Result<BookshelfConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.apply_mode_defaults();
        self.config.validate()?;

        Ok(self.config)
    }

    fn parse_file(content: &str, path: &Path) -> Result<BookshelfConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => {
                self.config.server.http_addr = value.to_string();
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["SERVER", "MODE"] => {
                self.config.server.mode = value
                    .parse()
                    .map_err(|reason: String| ConfigError::env_parse_error(key, reason))?;
            }

            ["SITE", "PAGE_PATH"] => self.config.site.page_path = value.to_string(),
            ["SITE", "STATIC_DIR"] => self.config.site.static_dir = value.to_string(),
            ["SITE", "TITLE"] => self.config.site.title = value.to_string(),
            ["SITE", "HEADING"] => self.config.site.heading = value.to_string(),
            ["SITE", "CONTENT"] => self.config.site.content = value.to_string(),

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = value
                    .parse()
                    .map_err(|reason: String| ConfigError::env_parse_error(key, reason))?;
            }
            ["LOGGING", "FILE"] => {
                self.config.logging.file = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            // Unknown keys are ignored.
            _ => {}
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogFormat;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, BookshelfConfig::default());
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"server": {"mode": "demo"}, "site": {"title": "Shelf"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.mode, ServiceMode::Demo);
        assert_eq!(config.site.title, "Shelf");
        assert_eq!(config.site.heading, "Welcome to Bookshelf");
    }

    #[test]
    fn test_loader_with_string_unknown_format() {
        let result = ConfigLoader::new().with_string("", "yaml");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_loader_with_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"\nformat = \"json\"").unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_file_replaces_preset() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nhttp_addr = \"127.0.0.1:9000\"").unwrap();

        let config = ConfigLoader::new()
            .with_preset(ServiceMode::Demo)
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.mode, ServiceMode::Crud);
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn test_demo_mode_from_file_logs_to_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nmode = \"demo\"").unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.mode, ServiceMode::Demo);
        assert_eq!(config.logging.file.as_deref(), Some("server.log"));
    }

    #[test]
    fn test_demo_mode_from_env_logs_to_file() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__MODE", "demo", "TEST").unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.logging.file.as_deref(), Some("server.log"));
    }

    #[test]
    fn test_demo_mode_keeps_explicit_log_file() {
        let config = ConfigLoader::new()
            .with_string("[server]\nmode = \"demo\"\n[logging]\nfile = \"shelf.log\"", "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.logging.file.as_deref(), Some("shelf.log"));
    }

    #[test]
    fn test_loader_with_file_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/bookshelf.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_rejects_invalid_addr() {
        let result = ConfigLoader::new()
            .with_string("[server]\nhttp_addr = \"localhost\"", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    // Environment variables are not mutated here because `set_var` needs
    // unsafe under the 2024 edition; apply_env_var is exercised directly.

    #[test]
    fn test_apply_env_var_server() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__HTTP_ADDR", "127.0.0.1:9000", "TEST").unwrap();
        loader.apply_env_var("TEST__SERVER__SHUTDOWN_TIMEOUT_SECS", "12", "TEST").unwrap();
        loader.apply_env_var("TEST__SERVER__MODE", "demo", "TEST").unwrap();

        assert_eq!(loader.config.server.http_addr, "127.0.0.1:9000");
        assert_eq!(loader.config.server.shutdown_timeout_secs, 12);
        assert_eq!(loader.config.server.mode, ServiceMode::Demo);
    }

    #[test]
    fn test_apply_env_var_site() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SITE__STATIC_DIR", "/srv/assets", "TEST").unwrap();
        loader.apply_env_var("TEST__SITE__HEADING", "Hello", "TEST").unwrap();

        assert_eq!(loader.config.site.static_dir, "/srv/assets");
        assert_eq!(loader.config.site.heading, "Hello");
    }

    #[test]
    fn test_apply_env_var_logging_file() {
        let mut loader = ConfigLoader::new().with_preset(ServiceMode::Demo);
        loader.apply_env_var("TEST__LOGGING__FILE", "", "TEST").unwrap();
        assert_eq!(loader.config.logging.file, None);

        loader.apply_env_var("TEST__LOGGING__FILE", "out.log", "TEST").unwrap();
        assert_eq!(loader.config.logging.file.as_deref(), Some("out.log"));
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__SERVER__SHUTDOWN_TIMEOUT_SECS", "soon", "TEST")
            .is_err());
        assert!(loader.apply_env_var("TEST__SERVER__MODE", "static", "TEST").is_err());
        assert!(loader.apply_env_var("TEST__LOGGING__ENABLED", "maybe", "TEST").is_err());
        assert!(loader.apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST").is_err());
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__WORKERS", "8", "TEST").unwrap();
        assert_eq!(loader.config, BookshelfConfig::default());
    }
}
