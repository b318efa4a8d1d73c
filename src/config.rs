//! Configuration Management
//!
//! Handles persistent configuration storage for gcpref and assembles the
//! ambient defaults consulted during resolution.

use crate::gcloud::{region_of_zone, GcloudDefaults};
use crate::resource::ParamValues;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keys accepted by `config set` / `config unset`
pub const CONFIG_KEYS: &[&str] = &["project", "region", "zone"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown config key '{0}' (expected one of: project, region, zone)")]
    UnknownKey(String),

    #[error("no configuration directory available")]
    NoConfigDir,

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Default project ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Default region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Default zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcpref").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file; missing or unreadable files
    /// yield the default configuration
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    fn slot(&mut self, key: &str) -> Result<&mut Option<String>, ConfigError> {
        match key {
            "project" => Ok(&mut self.project_id),
            "region" => Ok(&mut self.region),
            "zone" => Ok(&mut self.zone),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Set a default value
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        *self.slot(key)? = Some(value.to_string());
        Ok(())
    }

    /// Clear a default value
    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        *self.slot(key)? = None;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "project" => self.project_id.as_deref(),
            "region" => self.region.as_deref(),
            "zone" => self.zone.as_deref(),
            _ => None,
        }
    }

    /// Effective project (config > gcloud default)
    pub fn effective_project(&self, gcloud: &GcloudDefaults) -> Option<String> {
        self.project_id.clone().or_else(|| gcloud.project.clone())
    }

    /// Effective zone (config > gcloud default)
    pub fn effective_zone(&self, gcloud: &GcloudDefaults) -> Option<String> {
        self.zone.clone().or_else(|| gcloud.zone.clone())
    }

    /// Effective region (config > gcloud default > region of effective zone)
    pub fn effective_region(&self, gcloud: &GcloudDefaults) -> Option<String> {
        self.region
            .clone()
            .or_else(|| gcloud.region.clone())
            .or_else(|| {
                self.effective_zone(gcloud)
                    .and_then(|zone| region_of_zone(&zone))
            })
    }

    /// Ambient defaults keyed by parameter name. Only values that are
    /// actually configured appear.
    pub fn ambient_defaults(&self, gcloud: &GcloudDefaults) -> ParamValues {
        let mut defaults = ParamValues::new();
        let entries = [
            ("project", self.effective_project(gcloud)),
            ("region", self.effective_region(gcloud)),
            ("zone", self.effective_zone(gcloud)),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                defaults.insert(key.to_string(), value);
            }
        }
        defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcloud(project: Option<&str>, region: Option<&str>, zone: Option<&str>) -> GcloudDefaults {
        GcloudDefaults {
            project: project.map(String::from),
            region: region.map(String::from),
            zone: zone.map(String::from),
        }
    }

    #[test]
    fn test_set_and_unset() {
        let mut config = Config::default();
        config.set("project", "my-project").unwrap();
        config.set("zone", "us-east1-b").unwrap();
        assert_eq!(config.get("project"), Some("my-project"));
        assert_eq!(config.zone.as_deref(), Some("us-east1-b"));

        config.unset("zone").unwrap();
        assert_eq!(config.get("zone"), None);

        let err = config.set("bucket", "b").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(ref key) if key == "bucket"));
    }

    #[test]
    fn test_config_wins_over_gcloud() {
        let mut config = Config::default();
        config.set("project", "config-project").unwrap();
        let defaults = config.ambient_defaults(&gcloud(Some("gcloud-project"), None, None));
        assert_eq!(defaults.get("project").map(String::as_str), Some("config-project"));
    }

    #[test]
    fn test_region_derived_from_zone() {
        let config = Config::default();
        let defaults = config.ambient_defaults(&gcloud(None, None, Some("us-central1-f")));
        assert_eq!(defaults.get("zone").map(String::as_str), Some("us-central1-f"));
        assert_eq!(defaults.get("region").map(String::as_str), Some("us-central1"));
        assert!(!defaults.contains_key("project"));
    }

    #[test]
    fn test_nothing_configured_means_no_defaults() {
        let defaults = Config::default().ambient_defaults(&GcloudDefaults::default());
        assert!(defaults.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("gcpref-config-{}", std::process::id()))
            .join("config.json");

        let mut config = Config::default();
        config.set("region", "europe-west4").unwrap();
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_corrupt_config_falls_back_to_default() {
        let path = std::env::temp_dir().join(format!("gcpref-corrupt-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        std::fs::remove_file(&path).ok();
    }
}
