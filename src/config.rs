use crate::common::error::{Result, ToolkitError};
use serde::Deserialize;
use std::fs;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Local database file; ignored when LIBSQL_URL points at a remote instance.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "toolkit.db".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "catalog/control_catalog.yaml".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ToolkitError::Config(format!("Failed to read config file '{config_path}': {e}"))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Load `config.toml`, falling back to defaults so the service can boot
    /// with zero configuration.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Using default configuration: {e}");
                Self::default()
            }
        }
    }
}
