//! Turns a [`BookshelfConfig`] into a runnable server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bookshelf_config::{BookshelfConfig, ConfigLoader, LogFormat, LoggingSection, ServiceMode};
use bookshelf_core::{BookStore, FixedCatalog};
use bookshelf_server::{App, PageData, PageTemplate, Server, ServerConfig};
use bookshelf_telemetry::{LogConfig, LogTarget};
use tracing::info;

use crate::error::BookshelfResult;

/// Prefix of the environment overrides, as in `BOOKSHELF__SERVER__MODE`.
pub const ENV_PREFIX: &str = "BOOKSHELF";

/// Command-line overrides applied on top of the configuration layers.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Configuration file (TOML or JSON).
    pub config: Option<PathBuf>,
    /// Service mode; also selects the starting preset.
    pub mode: Option<ServiceMode>,
    /// Listen address.
    pub addr: Option<String>,
}

/// Loads the configuration: preset, file, `.env`, environment, then
/// command-line overrides.
///
/// # Errors
///
/// Returns the first loading or validation error.
pub fn load_config(options: &ServeOptions) -> BookshelfResult<BookshelfConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(mode) = options.mode {
        loader = loader.with_preset(mode);
    }
    if let Some(path) = &options.config {
        loader = loader.with_file(path)?;
    }
    let mut config = loader.with_dotenv()?.with_env_prefix(ENV_PREFIX).load()?;

    if let Some(mode) = options.mode {
        config.server.mode = mode;
    }
    if let Some(addr) = &options.addr {
        config.server.http_addr.clone_from(addr);
    }
    config.apply_mode_defaults();
    config.validate()?;
    Ok(config)
}

/// Maps the `[logging]` section onto the telemetry settings.
pub fn log_config(section: &LoggingSection) -> LogConfig {
    let format = match section.format {
        LogFormat::Json => bookshelf_telemetry::LogFormat::Json,
        LogFormat::Pretty => bookshelf_telemetry::LogFormat::Pretty,
        LogFormat::Compact => bookshelf_telemetry::LogFormat::Compact,
    };
    let target = section
        .file
        .as_ref()
        .map_or(LogTarget::Stdout, LogTarget::file);

    LogConfig {
        enabled: section.enabled,
        level: section.level.clone(),
        format,
        target,
        ..LogConfig::default()
    }
}

/// Maps the `[server]` section onto the server settings.
pub fn server_config(config: &BookshelfConfig) -> ServerConfig {
    ServerConfig::builder()
        .http_addr(config.server.http_addr.clone())
        .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .build()
}

/// Builds the application for the configured mode.
///
/// # Errors
///
/// In demo mode, returns `BookshelfError::Template` if the page template
/// cannot be read or parsed.
pub fn build_app(config: &BookshelfConfig) -> BookshelfResult<App> {
    let site = &config.site;
    let app = match config.server.mode {
        ServiceMode::Crud => App::crud(Arc::new(BookStore::new()), &site.page_path),
        ServiceMode::Demo => {
            let template = PageTemplate::from_file(&site.page_path)?;
            let data = PageData::new(&site.title, &site.heading, &site.content);
            App::demo(
                Arc::new(FixedCatalog::demo()),
                template,
                data,
                &site.static_dir,
            )
        }
    };
    info!(mode = %config.server.mode, catalog = app.catalog().name(), "Application ready");
    Ok(app)
}

/// Builds the server for `config`.
///
/// # Errors
///
/// See [`build_app`].
pub fn build_server(config: &BookshelfConfig) -> BookshelfResult<Server> {
    Ok(Server::new(server_config(config), build_app(config)?))
}
