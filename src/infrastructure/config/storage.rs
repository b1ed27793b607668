use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::{info, warn};

use super::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, AppConfig};

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Locates, creates and reads `config.toml`.
pub struct ConfigStore {
    config_dir: PathBuf,
}

impl ConfigStore {
    /// Uses the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::ConfigDirNotFound)?;

        Ok(Self { config_dir })
    }

    #[must_use]
    pub const fn with_dir(path: PathBuf) -> Self {
        Self { config_dir: path }
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loads the configuration, writing defaults if the file is missing.
    ///
    /// A file that fails to parse is reported and replaced by defaults in
    /// memory; it is not overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or the default cannot be written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let config_path = path_override.map_or_else(
            || self.config_dir.join(CONFIG_FILE_NAME),
            Path::to_path_buf,
        );

        if !config_path.exists() {
            info!(path = %config_path.display(), "Config file not found, creating default");
            let default_config = AppConfig::default();
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&config_path, toml::to_string_pretty(&default_config)?)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path)?;
        match toml::from_str::<AppConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(error = %e, "Failed to parse config file, using defaults");
                Ok(AppConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::with_dir(dir.path().join("nested"));

        let config = store.load_config(None).unwrap();

        assert_eq!(config.poll_interval_ms, AppConfig::default().poll_interval_ms);
        let written = fs::read_to_string(store.config_dir().join(CONFIG_FILE_NAME)).unwrap();
        assert!(written.contains("poll_interval_ms"));
    }

    #[test]
    fn test_reads_override_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "api_url = \"https://care.example.org\"\n").unwrap();

        let config = ConfigStore::with_dir(dir.path().to_path_buf())
            .load_config(Some(&path))
            .unwrap();

        assert_eq!(config.api_url, "https://care.example.org");
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "poll_interval_ms = \"often\"").unwrap();

        let config = ConfigStore::with_dir(dir.path().to_path_buf())
            .load_config(None)
            .unwrap();

        assert_eq!(config.poll_interval_ms, AppConfig::default().poll_interval_ms);
        assert_eq!(fs::read_to_string(&path).unwrap(), "poll_interval_ms = \"often\"");
    }
}
