//! TOML-based application configuration.
//!
//! Stores operator settings:
//! - Periodic refresh wake hours
//! - Notifier credentials and endpoint
//! - Event feed location
//! - Data directory override
//!
//! Configuration is stored at `~/.config/resetbell[-dev]/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clock::RESET_HOUR;
use crate::error::ConfigError;
use crate::store::data_dir;

/// Periodic refresh configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Hours of day (reference timezone) at which the scheduler re-applies
    /// every guild's settings against fresh event data.
    #[serde(default = "default_refresh_hours")]
    pub hours: Vec<u32>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            hours: default_refresh_hours(),
        }
    }
}

/// Notifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: default_api_base(),
        }
    }
}

/// Event source configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsConfig {
    /// URL of the JSON event feed.
    #[serde(default)]
    pub feed_url: String,
}

// Default functions
fn default_refresh_hours() -> Vec<u32> {
    vec![RESET_HOUR, RESET_HOUR + 12]
}
fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/resetbell[-dev]/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub events: EventsConfig,
    /// Override for the directory holding per-guild alert settings.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default path. A missing file yields defaults; a
    /// malformed file is an error, never silently defaulted.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
