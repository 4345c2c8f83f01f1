use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{aggregate::DayBoundary, model::Coordinates};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "SKYVIEW_API_KEY";

/// OpenWeather credentials and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    pub api_key: Option<String>,
    pub geocoding_url: String,
    pub forecast_url: String,
    pub timeout_secs: u64,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocoding_url: "https://api.openweathermap.org/geo/1.0/direct".to_string(),
            forecast_url: "https://api.openweathermap.org/data/2.5/forecast".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a lookup is issued.
    pub debounce_ms: u64,
    /// Maximum number of suggestions requested from the geocoder.
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300, limit: 5 }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of day tiles shown below current conditions.
    pub days: usize,
    pub day_boundary: DayBoundary,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { days: 5, day_boundary: DayBoundary::Local }
    }
}

/// Where "current location" comes from when no coordinates are passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// `false` behaves like a denied location permission.
    pub allow: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self { allow: true, latitude: None, longitude: None }
    }
}

impl LocationConfig {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [openweather]
/// api_key = "..."
///
/// [location]
/// latitude = 52.52
/// longitude = 13.41
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub openweather: OpenWeatherConfig,
    pub search: SearchConfig,
    pub display: DisplayConfig,
    pub location: LocationConfig,
}

impl Config {
    /// Load config from the default location, or return an empty default if
    /// it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
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
        let dirs = ProjectDirs::from("dev", "skyview", "skyview")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather.api_key = Some(api_key);
    }

    /// API key from the environment, else from the config file.
    pub fn api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        self.resolve_api_key(from_env)
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .or_else(|| self.openweather.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `skyview configure` or set {API_KEY_ENV}."
                )
            })
    }

    /// Home coordinates from the `[location]` table, validated.
    pub fn home(&self) -> Result<Option<Coordinates>> {
        self.location
            .coordinates()
            .map(|(lat, lon)| Coordinates::new(lat, lon))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.resolve_api_key(None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `skyview configure`"));
    }

    #[test]
    fn environment_key_wins_over_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        assert_eq!(cfg.resolve_api_key(None).unwrap(), "STORED");
        assert_eq!(cfg.resolve_api_key(Some("FROM_ENV".into())).unwrap(), "FROM_ENV");
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert!(cfg.resolve_api_key(None).is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert!(cfg.openweather.api_key.is_none());
        assert_eq!(cfg.search.limit, 5);
        assert_eq!(cfg.display.days, 5);
        assert!(cfg.location.allow);
    }

    #[test]
    fn save_and_load_through_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.display.day_boundary = DayBoundary::City;
        cfg.location.latitude = Some(48.85);
        cfg.location.longitude = Some(2.35);
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.openweather.api_key.as_deref(), Some("KEY"));
        assert_eq!(loaded.display.day_boundary, DayBoundary::City);
        assert_eq!(loaded.home().unwrap(), Some(Coordinates::new(48.85, 2.35).unwrap()));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\ndebounce_ms = 50\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.search.debounce(), Duration::from_millis(50));
        assert_eq!(cfg.search.limit, 5);
        assert!(cfg.openweather.forecast_url.ends_with("/data/2.5/forecast"));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "openweather = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn home_rejects_invalid_coordinates() {
        let mut cfg = Config::default();
        cfg.location.latitude = Some(123.0);
        cfg.location.longitude = Some(0.0);
        assert!(cfg.home().is_err());

        cfg.location.longitude = None;
        assert_eq!(cfg.home().unwrap(), None);
    }
}
