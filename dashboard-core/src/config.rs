use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::units::Unit;

pub const DEFAULT_FOOTER_AUTHOR: &str = "Mainak Chaudhuri";
pub const DEFAULT_FOOTER_GITHUB: &str = "MainakVerse";
pub const DEFAULT_FOOTER_REPO: &str = "mausumnet";

/// OpenWeather credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Attribution shown in the dashboard footer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FooterConfig {
    pub author: Option<String>,
    pub github_username: Option<String>,
    /// Repository name under the GitHub profile.
    pub repo: Option<String>,
}

impl FooterConfig {
    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or(DEFAULT_FOOTER_AUTHOR)
    }

    pub fn github_url(&self) -> String {
        let user = self.github_username.as_deref().unwrap_or(DEFAULT_FOOTER_GITHUB);
        format!("https://github.com/{user}")
    }

    pub fn repo_url(&self) -> String {
        let repo = self.repo.as_deref().unwrap_or(DEFAULT_FOOTER_REPO);
        format!("{}/{repo}", self.github_url())
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_unit = "imperial"
/// default_location = "Berlin"
///
/// [openweather]
/// api_key = "..."
///
/// [footer]
/// author = "Jane Doe"
/// github_username = "jdoe"
/// repo = "weather"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Unit the dashboard opens with, "metric" or "imperial".
    pub default_unit: Option<String>,

    pub default_location: Option<String>,

    pub openweather: Option<ProviderConfig>,

    #[serde(default)]
    pub footer: FooterConfig,
}

impl Config {
    /// Configured default unit, or `None` if unset.
    pub fn default_unit(&self) -> Result<Option<Unit>> {
        self.default_unit.as_deref().map(Unit::try_from).transpose()
    }

    pub fn set_default_unit(&mut self, unit: Unit) {
        self.default_unit = Some(unit.as_str().to_string());
    }

    /// Initial unit for a dashboard: explicit choice, then config, then metric.
    pub fn initial_unit(&self, explicit: Option<Unit>) -> Result<Unit> {
        match explicit {
            Some(unit) => Ok(unit),
            None => Ok(self.default_unit()?.unwrap_or_default()),
        }
    }

    /// Returns the OpenWeather API key, if present.
    pub fn api_key(&self) -> Option<&str> {
        self.openweather.as_ref().map(|cfg| cfg.api_key.as_str())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather = Some(ProviderConfig { api_key });
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
