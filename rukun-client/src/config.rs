//! Configuration loading for the Rukun client.
//!
//! Values come from a TOML file (`--config <path>` or `RUKUN_CLIENT_CONFIG`)
//! or, when no file is named, from environment variables with placeholder
//! defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.example.com";
pub const DEFAULT_WS_URL: &str = "wss://api.example.com/ws";
pub const DEFAULT_STORAGE_PATH: &str = ".rukun/storage.json";
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_LOG_FILTER: &str = "rukun_client=info";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub ws_base_url: String,
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// `None` leaves the transport's own timeout in place.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default = "default_cache_ttl_ms")]
    pub default_cache_ttl_ms: u64,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconnectConfig {
    pub base_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_attempts: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            ws_base_url: DEFAULT_WS_URL.to_string(),
            storage_path: default_storage_path(),
            request_timeout_ms: None,
            default_cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            reconnect: ReconnectConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl ClientConfig {
    /// Load from `--config`, then `RUKUN_CLIENT_CONFIG`, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match config_path_from_args().or_else(config_path_from_env) {
            Some(path) => Self::from_path(&path)?,
            None => Self::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Read `RUKUN_API_URL`, `RUKUN_WS_URL` and `RUKUN_STORAGE_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: lookup("RUKUN_API_URL").unwrap_or(defaults.api_base_url),
            ws_base_url: lookup("RUKUN_WS_URL").unwrap_or(defaults.ws_base_url),
            storage_path: lookup("RUKUN_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            ..defaults
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.ws_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ws_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.storage_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0 when set".to_string(),
            });
        }
        if self.default_cache_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_cache_ttl_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.reconnect.base_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnect.base_delay_ms",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn default_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.default_cache_ttl_ms)
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_PATH)
}

fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("RUKUN_CLIENT_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
