//! Application configuration management.
//!
//! This module handles loading the application configuration:
//! the lookup service URL, the request timeout and optional overrides for
//! where saved addresses are stored.
//!
//! Configuration is stored at `~/.config/cepbook/config.json`. Environment
//! variables (or a `.env` file loaded by the binary) take precedence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Application name used for config/data/session directory paths
pub const APP_NAME: &str = "cepbook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment overrides
const ENV_LOOKUP_URL: &str = "CEPBOOK_LOOKUP_URL";
const ENV_DATA_DIR: &str = "CEPBOOK_DATA_DIR";
const ENV_SESSION_DIR: &str = "CEPBOOK_SESSION_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub lookup_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub session_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit file. A missing file yields the defaults,
    /// an unreadable or malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply environment variable overrides on top of the file settings
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_LOOKUP_URL) {
            self.lookup_base_url = Some(url);
        }
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(dir) = std::env::var(ENV_SESSION_DIR) {
            self.session_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn lookup_base_url(&self) -> String {
        self.lookup_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Directory for the durable store (saved addresses survive restarts)
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Directory for the session store.
    /// The runtime dir is wiped by the host when the login session ends.
    pub fn session_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.session_dir {
            return dir.clone();
        }
        dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_NAME)
    }

    /// Directory for log files. Independent of the config file so logging
    /// can start before the config is read.
    pub fn log_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
