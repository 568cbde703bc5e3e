//! Configuration loading
//!
//! Bootstrap configuration is a TOML file resolved in this order:
//! 1. Command-line argument (highest priority)
//! 2. `AGRIX_CONFIG` environment variable
//! 3. `<config_dir>/agrix/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing file is never fatal: it is logged and the defaults are used.
//! A file that exists but does not parse is a configuration error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "AGRIX_CONFIG";

/// Environment variable overriding `[store] base_url`
pub const STORE_URL_ENV_VAR: &str = "AGRIX_STORE_URL";

/// Complete bootstrap configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Record store connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the record store API (no trailing slash required)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Rows requested per page when fetching a whole kind
    #[serde(default = "default_bulk_page_size")]
    pub bulk_page_size: u32,

    /// Upper bound on pages walked for one kind
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Fetch farmer detail when a listed farmer omits its nested crops/rice
    #[serde(default = "default_true")]
    pub hydrate_nested: bool,

    /// Concurrent farmer detail requests during hydration
    #[serde(default = "default_hydrate_concurrency")]
    pub hydrate_concurrency: usize,
}

/// Inventory view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Settling window for free-text search input
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

/// Snapshot cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Snapshots older than this are refetched
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bulk_page_size() -> u32 {
    500
}

fn default_max_pages() -> u32 {
    200
}

fn default_true() -> bool {
    true
}

fn default_hydrate_concurrency() -> usize {
    4
}

fn default_page_size() -> usize {
    10
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_max_age_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            bulk_page_size: default_bulk_page_size(),
            max_pages: default_max_pages(),
            hydrate_nested: default_true(),
            hydrate_concurrency: default_hydrate_concurrency(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Reject settings the rest of the system cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.store.base_url.trim().is_empty() {
            return Err(Error::Config("store.base_url must not be empty".to_string()));
        }
        if self.store.bulk_page_size == 0 {
            return Err(Error::Config("store.bulk_page_size must be at least 1".to_string()));
        }
        if self.store.max_pages == 0 {
            return Err(Error::Config("store.max_pages must be at least 1".to_string()));
        }
        if self.store.hydrate_concurrency == 0 {
            return Err(Error::Config(
                "store.hydrate_concurrency must be at least 1".to_string(),
            ));
        }
        if self.query.page_size == 0 {
            return Err(Error::Config("query.page_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Apply the store URL override: CLI flag beats environment beats file
    pub fn apply_store_url_override(&mut self, cli_url: Option<&str>) {
        if let Some(url) = cli_url {
            self.store.base_url = url.to_string();
            return;
        }
        if let Ok(url) = std::env::var(STORE_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                self.store.base_url = url;
            }
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserConfigDir(PathBuf),
    Defaults,
}

/// Resolves and loads the bootstrap configuration
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Locate the config file without reading it
    pub fn locate(&self) -> ConfigSource {
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return ConfigSource::UserConfigDir(path);
            }
        }

        ConfigSource::Defaults
    }

    /// Resolve and load the configuration
    ///
    /// Missing files degrade to defaults with a warning; parse failures and
    /// invalid values are errors.
    pub fn resolve(&self) -> Result<(TomlConfig, ConfigSource)> {
        let source = self.locate();

        let config = match &source {
            ConfigSource::CommandLine(path)
            | ConfigSource::Environment(path)
            | ConfigSource::UserConfigDir(path) => {
                if path.exists() {
                    let config = load_toml_config(path)?;
                    info!(path = %path.display(), "Loaded configuration file");
                    config
                } else {
                    warn!(
                        path = %path.display(),
                        "Configuration file not found, using defaults"
                    );
                    TomlConfig::default()
                }
            }
            ConfigSource::Defaults => {
                info!("No configuration file found, using compiled defaults");
                TomlConfig::default()
            }
        };

        config.validate()?;
        Ok((config, source))
    }
}

/// Default config file path for the platform (`~/.config/agrix/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("agrix").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    Ok(config)
}
