//! Configuration management for hexarc.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "hexarc";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "documents.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `HEXARC_`, sections separated
///    by `__`, e.g. `HEXARC_DEPLOYMENT__BUS_CAPACITY=512`)
/// 2. TOML config file at `~/.config/hexarc/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deployment configuration.
    pub deployment: DeploymentSection,
    /// Document store configuration.
    pub store: StoreSection,
    /// HTTP adapter configuration.
    pub http: HttpSection,
}

/// Deployment-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentSection {
    /// Upper bound for a single adapter start, in milliseconds.
    pub ready_timeout_ms: u64,
    /// Upper bound for a single adapter stop, in milliseconds.
    pub stop_timeout_ms: u64,
    /// Buffered events per bus address before slow subscribers lag.
    pub bus_capacity: usize,
}

/// Document-store-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Path to the database file.
    /// Defaults to `~/.local/share/hexarc/documents.db`
    pub database_path: Option<PathBuf>,
}

/// HTTP-adapter-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Socket address HTTP adapters bind by default.
    /// Port 0 asks the OS for a free port.
    pub bind_addr: String,
}

impl Default for DeploymentSection {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 10_000,
            stop_timeout_ms: 5_000,
            bus_capacity: 256,
        }
    }
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `HEXARC_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("HEXARC_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.deployment.ready_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "ready_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.deployment.stop_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "stop_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.deployment.bus_capacity == 0 {
            return Err(Error::ConfigValidation {
                message: "bus_capacity must be greater than 0".to_string(),
            });
        }

        if self.http.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid bind address: {}", self.http.bind_addr),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the adapter start bound as a Duration.
    #[must_use]
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.deployment.ready_timeout_ms)
    }

    /// Get the adapter stop bound as a Duration.
    #[must_use]
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.deployment.stop_timeout_ms)
    }

    /// Get the configured HTTP bind address as a socket address.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured string does not parse.
    pub fn http_bind_addr(&self) -> Result<SocketAddr> {
        self.http
            .bind_addr
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid bind address: {}", self.http.bind_addr),
            })
    }
}
