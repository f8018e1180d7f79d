use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{model::Coordinates, provider::ProviderId};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("weather-dashboard/", env!("CARGO_PKG_VERSION"));

/// Per-provider overrides (e.g. a self-hosted Nominatim).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
}

/// Where the automatic lookup lands when geolocation is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for DefaultLocation {
    fn default() -> Self {
        Self {
            name: "New York".to_string(),
            latitude: 40.7128,
            longitude: -74.006,
        }
    }
}

impl DefaultLocation {
    pub fn coordinates(&self) -> Coordinates {
        let name = self.name.clone();
        Coordinates::new(self.latitude, self.longitude, name)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Geocoder id, e.g. "nominatim" or "open-meteo". Nominatim when unset.
    pub geocoder: Option<String>,

    /// Example TOML:
    /// [providers.nominatim]
    /// base_url = "https://nominatim.example.org"
    pub providers: HashMap<String, ProviderConfig>,

    /// Forecast endpoint override.
    pub forecast_url: Option<String>,

    /// Budget for each outbound call, in seconds.
    pub timeout_secs: u64,

    /// Budget for obtaining a geolocation fix, in seconds.
    pub locate_timeout_secs: u64,

    pub user_agent: Option<String>,

    pub default_location: DefaultLocation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoder: None,
            providers: HashMap::new(),
            forecast_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            locate_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            default_location: DefaultLocation::default(),
        }
    }
}

impl Config {
    /// Return the configured geocoder as a strongly-typed ProviderId.
    pub fn geocoder_id(&self) -> Result<ProviderId> {
        match self.geocoder.as_deref() {
            None => Ok(ProviderId::Nominatim),
            Some(s) => ProviderId::try_from(s),
        }
    }

    pub fn set_geocoder(&mut self, id: ProviderId) {
        self.geocoder = Some(id.as_str().to_string());
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn locate_timeout(&self) -> Duration {
        Duration::from_secs(self.locate_timeout_secs.max(1))
    }

    pub fn user_agent(&self) -> String {
        match &self.user_agent {
            Some(agent) => agent.clone(),
            None => DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
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

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider base URL and select that provider if none is chosen yet.
    pub fn upsert_provider_base_url(&mut self, provider_id: ProviderId, base_url: String) {
        let key = provider_id.as_str().to_string();
        self.providers.insert(key, ProviderConfig { base_url });

        if self.geocoder.is_none() {
            self.geocoder = Some(provider_id.to_string());
        }
    }

    /// Returns the base URL override for a provider, if present.
    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        let provider = self.providers.get(provider_id.as_str())?;
        Some(provider.base_url.as_str())
    }
}
