//! Config - TOML settings with a default for every field.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:6543"
//!
//! [database]
//! uri = "file://var/mint.db"
//! base = "mint_root"
//!
//! [storage]
//! video_dir = "var/videos"
//! static_dir = "static"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "cannot read config {}: {}", path.display(), message)
            }
            ConfigError::Parse(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    /// JSON seed used when the root is first bootstrapped.
    pub seed: Option<PathBuf>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Site title for a freshly bootstrapped root.
    pub title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:6543".to_string(),
            title: "mint".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `file://<path>` or `memory://`.
    pub uri: String,
    /// Named root inside the database.
    pub base: String,
    /// Commit attempts per request when writers conflict.
    pub retry_attempts: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "file://var/mint.db".to_string(),
            base: "mint_root".to_string(),
            retry_attempts: 3,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub video_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("var/videos"),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(?config, "loaded config");
        Ok(config)
    }

    /// An in-memory setup for tests and demos.
    pub fn in_memory(base: &str) -> Self {
        Self {
            database: DatabaseConfig {
                uri: "memory://".to_string(),
                base: base.to_string(),
                ..DatabaseConfig::default()
            },
            ..Self::default()
        }
    }
}
