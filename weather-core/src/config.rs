use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{cache::DEFAULT_TTL_SECS, model::TemperatureUnit, retry::RetryConfig};

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_ALERTS_BASE_URL: &str = "https://api.openweathermap.org/data/3.0";
pub const DEFAULT_GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Provider base URLs. Paths such as `/weather` are appended to these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub base_url: String,
    pub alerts_base_url: String,
    pub geo_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            alerts_base_url: DEFAULT_ALERTS_BASE_URL.to_string(),
            geo_base_url: DEFAULT_GEO_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at one server, as a test double would need.
    pub fn single(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            base_url: format!("{base}/data/2.5"),
            alerts_base_url: format!("{base}/data/3.0"),
            geo_base_url: format!("{base}/geo/1.0"),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit = "fahrenheit"
///
/// [endpoints]
/// base_url = "https://api.openweathermap.org/data/2.5"
///
/// [retry]
/// max_retries = 0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub unit: TemperatureUnit,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub endpoints: Endpoints,
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            unit: TemperatureUnit::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_TTL_SECS,
            endpoints: Endpoints::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    /// `OPENWEATHER_API_KEY` takes precedence over the stored key.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;

        if let Some(key) = std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
        {
            cfg.api_key = Some(key);
        }

        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
