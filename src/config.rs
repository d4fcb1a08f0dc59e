//! Configuration file handling.
//!
//! This module provides loading and saving of codats configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/codats/config.toml`
//! - macOS: `~/Library/Application Support/codats/config.toml`
//! - Windows: `%APPDATA%\codats\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! api_base_url = "http://localhost:5000"
//! scan_timeout_secs = 60
//! fix_timeout_secs = 120
//! default_format = "table"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use codats::Config;
///
/// let config = Config::load().unwrap();
/// println!("API: {}", config.api_base_url);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the scan/advisory API.
    pub api_base_url: String,

    /// Timeout for scan requests, in seconds.
    ///
    /// Default: 60
    pub scan_timeout_secs: u64,

    /// Timeout for advisory (AI fix) requests, in seconds. AI analysis is
    /// slower than scanning.
    ///
    /// Default: 120
    pub fix_timeout_secs: u64,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            scan_timeout_secs: 60,
            fix_timeout_secs: 120,
            default_format: "table".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codats")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
