//! Configuration management for the listing proxy
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. TOML config file (explicit `--config`, or a standard location)
//! 3. Process environment (`ZAP_PROPERTIES_ENDPOINT`, `HOST`), including `.env`
//! 4. Command-line flags
//!
//! [`AppConfig::validate`] turns the layered settings into a
//! [`ValidatedConfig`]; the upstream URL and bind address have no defaults
//! and must come from one of the layers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::app::{CacheConfig, Channel, ClientConfig};
use crate::constants::{config_files, env};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Upstream catalog settings
    pub upstream: UpstreamConfig,
    /// Bucket cache settings
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// File the settings were read from, if any
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, `host:port` or Go-style `:port`
    pub bind_address: Option<String>,
    /// Channels accepted in the `source` header
    pub datasources: Vec<Channel>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: None,
            datasources: Channel::ALL.to_vec(),
        }
    }
}

/// Upstream catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Catalog endpoint returning the JSON listing array
    pub url: Option<String>,
    /// HTTP client tuning
    #[serde(flatten)]
    pub client: ClientConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub upstream_url: Option<String>,
    pub bind_address: Option<String>,
}

/// Configuration checked and ready to start the server with
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub bind_address: String,
    pub upstream_url: Url,
    pub client: ClientConfig,
    pub cache: CacheConfig,
    pub datasources: Vec<Channel>,
}

impl AppConfig {
    /// Load configuration from the config file layer
    ///
    /// An explicitly given file must exist; otherwise the standard locations
    /// are searched and defaults are used if none is found.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        match config_path {
            Some(path) => Self::load_from_file(&path).await,
            None => Ok(Self::default()),
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(config_files::LOCAL_FILE)];
        if let Ok(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        search_paths.into_iter().find(|path| path.exists())
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(config_files::APP_DIR)
            .join(config_files::FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config: AppConfig = toml::from_str(&content)?;
        config.loaded_from = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply the process environment layer
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply environment values obtained through `lookup`
    ///
    /// Empty values count as unset.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(env::UPSTREAM_URL) {
            debug!("Upstream URL taken from {}", env::UPSTREAM_URL);
            self.upstream.url = Some(url);
        }
        if let Some(address) = lookup(env::BIND_ADDRESS) {
            debug!("Bind address taken from {}", env::BIND_ADDRESS);
            self.server.bind_address = Some(address);
        }
    }

    /// Apply the command-line layer
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.upstream_url {
            self.upstream.url = Some(url.clone());
        }
        if let Some(address) = &overrides.bind_address {
            self.server.bind_address = Some(address.clone());
        }
    }

    /// Check that the server can be started with these settings
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` when the upstream URL or bind
    /// address is unset and `ConfigError::InvalidValue` when a value is
    /// malformed.
    pub fn validate(&self) -> ConfigResult<ValidatedConfig> {
        let url = self
            .upstream
            .url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField {
                field: "upstream.url".to_string(),
                env_var: env::UPSTREAM_URL.to_string(),
            })?;
        let upstream_url = parse_upstream_url(url)?;

        let address =
            self.server
                .bind_address
                .as_deref()
                .ok_or_else(|| ConfigError::MissingField {
                    field: "server.bind_address".to_string(),
                    env_var: env::BIND_ADDRESS.to_string(),
                })?;
        let bind_address = normalize_bind_address(address)?;

        if self.server.datasources.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.datasources".to_string(),
                value: "[]".to_string(),
                reason: "At least one channel must be accepted".to_string(),
            });
        }

        if self.cache.ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "cache.ttl".to_string(),
                value: "0s".to_string(),
                reason: "Buckets would expire as soon as they are stored".to_string(),
            });
        }

        if self.cache.cleanup_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "cache.cleanup_interval".to_string(),
                value: "0s".to_string(),
                reason: "The sweep interval must be positive".to_string(),
            });
        }

        Ok(ValidatedConfig {
            bind_address,
            upstream_url,
            client: self.upstream.client.clone(),
            cache: self.cache.clone(),
            datasources: self.server.datasources.clone(),
        })
    }
}

fn parse_upstream_url(value: &str) -> ConfigResult<Url> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: "upstream.url".to_string(),
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("Unsupported scheme '{}'", other))),
    }
}

/// `:8080` binds every interface, as Go listeners do
fn normalize_bind_address(value: &str) -> ConfigResult<String> {
    let value = value.trim();
    let invalid = |reason: &str| ConfigError::InvalidValue {
        field: "server.bind_address".to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| invalid("Expected host:port"))?;
    port.parse::<u16>()
        .map_err(|_| invalid("Port must be a number between 0 and 65535"))?;

    if host.is_empty() {
        Ok(format!("0.0.0.0:{}", port))
    } else {
        Ok(value.to_string())
    }
}
