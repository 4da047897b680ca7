use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf, time::Duration};

use crate::model::Bookmark;

pub const DEFAULT_BASE_URL: &str = "https://metapi.ana.lu/api/v1";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_SCAN_INTERVAL_MINUTES: u64 = 15;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A location picked from the MeteoLux bookmark list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub city_id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationConfig {
    /// Identity of the location: its coordinates.
    pub fn unique_id(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl From<&Bookmark> for LocationConfig {
    fn from(bookmark: &Bookmark) -> Self {
        Self {
            city_id: bookmark.id,
            name: bookmark.name.clone(),
            latitude: bookmark.lat,
            longitude: bookmark.long,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Display language passed to the forecast endpoint.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_scan_interval_minutes")]
    pub scan_interval_minutes: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Example TOML:
    /// [locations."49.6116,6.1319"]
    /// city_id = 1
    /// name = "Luxembourg"
    /// latitude = 49.6116
    /// longitude = 6.1319
    #[serde(default)]
    pub locations: BTreeMap<String, LocationConfig>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

const fn default_scan_interval_minutes() -> u64 {
    DEFAULT_SCAN_INTERVAL_MINUTES
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: default_language(),
            scan_interval_minutes: default_scan_interval_minutes(),
            timeout_secs: default_timeout_secs(),
            locations: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_minutes.max(1) * 60)
    }

    pub fn location(&self, key: &str) -> Option<&LocationConfig> {
        self.locations.get(key)
    }

    /// Add a location; fails if one with the same coordinates exists.
    pub fn add_location(&mut self, location: LocationConfig) -> Result<String> {
        let key = location.unique_id();
        if self.locations.contains_key(&key) {
            bail!("Location '{}' ({key}) is already configured.", location.name);
        }

        self.locations.insert(key.clone(), location);
        Ok(key)
    }

    pub fn remove_location(&mut self, key: &str) -> Option<LocationConfig> {
        self.locations.remove(key)
    }

    /// The configured location for `key`, or the only one if `key` is `None`.
    pub fn resolve_location(&self, key: Option<&str>) -> Result<(&str, &LocationConfig)> {
        match key {
            Some(key) => self
                .locations
                .get_key_value(key)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| anyhow!("No location configured with key '{key}'.")),
            None => {
                let mut iter = self.locations.iter();
                match (iter.next(), iter.next()) {
                    (Some((k, v)), None) => Ok((k.as_str(), v)),
                    (None, _) => Err(anyhow!(
                        "No location configured.\n\
                         Hint: run `meteolux setup` and pick a city first."
                    )),
                    _ => Err(anyhow!(
                        "Several locations are configured; pass one of: {}",
                        self.locations.keys().cloned().collect::<Vec<_>>().join(", ")
                    )),
                }
            }
        }
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("lu", "meteolux", "meteolux-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
