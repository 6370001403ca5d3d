use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    error::{ClimacellError, Result},
    request::UnitSystem,
};

pub const DEFAULT_BASE_URL: &str = "https://api.climacell.co";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit_system = "us"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides [`DEFAULT_BASE_URL`], e.g. to point at a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Unit system used when a request does not pick one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_system: Option<UnitSystem>,
}

impl Config {
    /// Returns the API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ClimacellError::ConfigRead(path.to_path_buf(), e))?;

        toml::from_str(&contents).map_err(|e| ClimacellError::ConfigParse(path.to_path_buf(), e))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ClimacellError::ConfigWrite(parent.to_path_buf(), e))?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml).map_err(|e| ClimacellError::ConfigWrite(path.to_path_buf(), e))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "climacell", "climacell-cli")
            .ok_or(ClimacellError::ConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::default();

        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert_eq!(cfg.api_key(), None);

        cfg.set_api_key(" KEY ".into());
        assert_eq!(cfg.api_key(), Some("KEY"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            unit_system: Some(UnitSystem::Us),
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("unit_system = \"us\""));
        assert!(!contents.contains("base_url"));

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "unit_system = \"metric\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ClimacellError::ConfigParse(..)));
        assert!(err.to_string().contains("config.toml"));
    }
}
