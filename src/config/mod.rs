//! Configuration management for the notifications service.
//!
//! Configuration is read from `~/.config/list-notifications/config.toml`
//! unless another path is given. If the default file doesn't exist, a
//! commented default configuration is created. Command-line flags and
//! environment variables override file values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::feed::FeedConfig;

pub const MAX_LIMIT: usize = 10_000;
pub const MAX_CACHE_DELAY_SECS: i64 = 86_400;
pub const MAX_SINCE_INTERVAL_DAYS: i64 = 3_650;

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// Host used when rendering public links.
    pub api_host: String,
    pub db_path: Option<PathBuf>,
    pub cache_delay_secs: i64,
    /// Maximum notifications per page.
    pub limit: usize,
    pub max_since_interval_days: i64,
    pub dump_requests: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            api_host: "api.ft.com".to_string(),
            db_path: None,
            cache_delay_secs: 10,
            limit: 200,
            max_since_interval_days: 90,
            dump_requests: false,
            log_level: "info".to_string(),
        }
    }
}

/// Values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub api_host: Option<String>,
    pub db_path: Option<PathBuf>,
    pub cache_delay_secs: Option<i64>,
    pub limit: Option<usize>,
    pub max_since_interval_days: Option<i64>,
    pub dump_requests: Option<bool>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// A missing file at the default path is created with commented
    /// defaults. A missing file at an explicit path is an error.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/list-notifications/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("list-notifications").join("config.toml"))
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(api_host) = overrides.api_host {
            self.api_host = api_host;
        }
        if let Some(db_path) = overrides.db_path {
            self.db_path = Some(db_path);
        }
        if let Some(secs) = overrides.cache_delay_secs {
            self.cache_delay_secs = secs;
        }
        if let Some(limit) = overrides.limit {
            self.limit = limit;
        }
        if let Some(days) = overrides.max_since_interval_days {
            self.max_since_interval_days = days;
        }
        if let Some(dump) = overrides.dump_requests {
            self.dump_requests = dump;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_host.trim().is_empty() {
            return Err(ConfigError::Invalid("api_host must not be empty".into()));
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        if !(0..=MAX_CACHE_DELAY_SECS).contains(&self.cache_delay_secs) {
            return Err(ConfigError::Invalid(format!(
                "cache_delay_secs must be between 0 and {}",
                MAX_CACHE_DELAY_SECS
            )));
        }
        if !(1..=MAX_SINCE_INTERVAL_DAYS).contains(&self.max_since_interval_days) {
            return Err(ConfigError::Invalid(format!(
                "max_since_interval_days must be between 1 and {}",
                MAX_SINCE_INTERVAL_DAYS
            )));
        }
        Ok(())
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            api_host: self.api_host.clone(),
            cache_delay: chrono::Duration::seconds(self.cache_delay_secs),
            limit: self.limit,
            max_since: chrono::Duration::days(self.max_since_interval_days),
        }
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# list-notifications configuration
#
# Every value can also be set on the command line or through the
# environment (APP_PORT, API_HOST, DB_PATH, CACHE_TTL, NOTIFICATIONS_LIMIT,
# MAX_SINCE_INTERVAL, DUMP_REQUESTS, LOG_LEVEL).

# Port to listen on
port = 8080

# Host used in the public links of the feed
api_host = "api.ft.com"

# SQLite database file; defaults to the user data directory
# db_path = "/var/lib/list-notifications/notifications.db"

# Seconds a notification stays hidden from the feed after it was written
cache_delay_secs = 10

# Maximum notifications per page
limit = 200

# How far back (in days) a 'since' parameter may reach
max_since_interval_days = 90

# Log the raw body of every write
dump_requests = false

# Initial log level; RUST_LOG takes precedence
log_level = "info"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
