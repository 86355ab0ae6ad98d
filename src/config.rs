use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::{self, Profile};

const DB_FILE_NAME: &str = "momentum.db";

/// Where the GUI window appears on launch. Stored for the desktop front-end;
/// the CLI ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowPosition {
    #[default]
    Centre,
    TopLeft,
}

/// Application configuration, persisted as JSON in the config directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Custom database file path; None means the default data directory.
    #[serde(default)]
    pub db_path: Option<String>,
    #[serde(default)]
    pub window_position: WindowPosition,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    ConfigDirError,
    #[error("Could not determine data directory")]
    DataDirError,
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Could not find a {0} sync folder")]
    CloudFolderNotFound(String),
}

impl AppConfig {
    /// Get the path to the config file for a profile
    pub fn config_path(profile: Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or(ConfigError::ConfigDirError)?;
        Ok(config_dir.join("config.json"))
    }

    /// Load configuration for a profile. A missing, unreadable, or malformed
    /// file falls back to defaults.
    pub fn load(profile: Profile) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(&Self::config_path(profile)?))
    }

    /// Load configuration from an explicit file path, defaulting on any
    /// read or parse failure.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => AppConfig::default(),
        }
    }

    /// Save configuration for a profile
    pub fn save(&self, profile: Profile) -> Result<(), ConfigError> {
        self.save_to_path(&Self::config_path(profile)?)
    }

    /// Save configuration to an explicit file path
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {e}")))?;
        fs::write(path, json).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Resolve the active database file path: the custom path if set,
    /// otherwise the default data directory. Parent directories are created.
    pub fn resolve_db_path(&self, profile: Profile) -> Result<PathBuf, ConfigError> {
        if let Some(custom) = &self.db_path {
            let path = utils::expand_path(custom);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::DirectoryError(e.to_string()))?;
            }
            return Ok(path);
        }

        let data_dir = utils::get_data_dir(profile).ok_or(ConfigError::DataDirError)?;
        fs::create_dir_all(&data_dir).map_err(|e| ConfigError::DirectoryError(e.to_string()))?;
        Ok(data_dir.join(DB_FILE_NAME))
    }
}

/// Set a custom database path and persist the config.
pub fn set_db_path(profile: Profile, path: &str) -> Result<AppConfig, ConfigError> {
    let mut resolved = utils::expand_path(path);
    // A directory gets the default file name appended
    if resolved.is_dir() {
        resolved = resolved.join(DB_FILE_NAME);
    }
    if let Some(parent) = resolved.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryError(e.to_string()))?;
    }

    let mut config = AppConfig::load(profile)?;
    config.db_path = Some(resolved.to_string_lossy().to_string());
    config.save(profile)?;
    Ok(config)
}

/// Reset to the default local database path.
pub fn reset_db_path(profile: Profile) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::load(profile)?;
    config.db_path = None;
    config.save(profile)?;
    Ok(config)
}

/// Try to find a cloud sync folder for the given provider under the home
/// directory.
pub fn detect_cloud_folder(provider: &str) -> Option<PathBuf> {
    let home = utils::home_dir()?;
    let candidates: &[&str] = match provider.to_lowercase().as_str() {
        "onedrive" => &["OneDrive", "onedrive"],
        "dropbox" => &["Dropbox", "dropbox"],
        "google-drive" => &["Google Drive", "google-drive"],
        _ => return None,
    };
    candidates
        .iter()
        .map(|c| home.join(c))
        .find(|p| p.is_dir())
}

/// Configure the database to live inside a cloud provider's sync folder.
pub fn set_cloud_sync(profile: Profile, provider: &str) -> Result<AppConfig, ConfigError> {
    let folder = detect_cloud_folder(provider)
        .ok_or_else(|| ConfigError::CloudFolderNotFound(provider.to_string()))?;
    let db_dir = folder.join("momentum");
    fs::create_dir_all(&db_dir).map_err(|e| ConfigError::DirectoryError(e.to_string()))?;
    set_db_path(profile, &db_dir.join(DB_FILE_NAME).to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().expect("create temp dir");
        let config = AppConfig::load_from_path(&dir.path().join("nope.json"));
        assert!(config.db_path.is_none());
        assert_eq!(config.window_position, WindowPosition::Centre);
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json at all").expect("write fixture");

        let config = AppConfig::load_from_path(&path);
        assert!(config.db_path.is_none());
        assert_eq!(config.window_position, WindowPosition::Centre);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig {
            db_path: Some("/tmp/custom/momentum.db".to_string()),
            window_position: WindowPosition::TopLeft,
        };
        config.save_to_path(&path).expect("save config");

        let loaded = AppConfig::load_from_path(&path);
        assert_eq!(loaded.db_path.as_deref(), Some("/tmp/custom/momentum.db"));
        assert_eq!(loaded.window_position, WindowPosition::TopLeft);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"db_path": null, "window_position": "centre", "future_field": 42}"#,
        )
        .expect("write fixture");

        let config = AppConfig::load_from_path(&path);
        assert!(config.db_path.is_none());
    }
}
