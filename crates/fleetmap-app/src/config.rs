//! Configuration management for fleetmap
//!
//! Config stored at: ~/.config/fleetmap/config.json

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fleetmap_types::{ConfigError, OutputFormat, Result};

/// Environment variable overriding `api_url`
pub const API_URL_ENV: &str = "FLEETMAP_API_URL";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the fleet API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Truck polling interval in milliseconds
    #[serde(default = "default_truck_poll_interval_ms")]
    pub truck_poll_interval_ms: u64,

    /// Per-request timeout in milliseconds, shorter than the poll interval
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Upper bound for the wait between failing polls
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Consecutive failures after which polling is reported as down
    #[serde(default = "default_persistent_failure_threshold")]
    pub persistent_failure_threshold: u32,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_api_url() -> String {
    "http://localhost:5125/api".to_string()
}

fn default_truck_poll_interval_ms() -> u64 {
    5000
}

fn default_request_timeout_ms() -> u64 {
    4000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

fn default_persistent_failure_threshold() -> u32 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            truck_poll_interval_ms: default_truck_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            persistent_failure_threshold: default_persistent_failure_threshold(),
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("fleetmap");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, then apply the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Load config from a file; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Override `api_url` with a non-empty environment value
    pub fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url is empty".into()).into());
        }
        if self.truck_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("truck_poll_interval_ms must be positive".into()).into());
        }
        if self.request_timeout_ms >= self.truck_poll_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "request_timeout_ms ({}) must be shorter than truck_poll_interval_ms ({})",
                self.request_timeout_ms, self.truck_poll_interval_ms
            ))
            .into());
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.truck_poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fleetmap Configuration")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(f, "API URL:             {}", self.api_url)?;
        writeln!(f, "Poll interval:       {} ms", self.truck_poll_interval_ms)?;
        writeln!(f, "Request timeout:     {} ms", self.request_timeout_ms)?;
        writeln!(f, "Backoff cap:         {} ms", self.backoff_max_ms)?;
        writeln!(f, "Failure threshold:   {}", self.persistent_failure_threshold)?;
        writeln!(f, "Output format:       {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:         {}", path.display())?;
        }

        Ok(())
    }
}
