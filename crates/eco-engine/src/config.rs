// config.rs — Engine configuration, loaded from TOML.
//
// Every field has a serde default, so an empty or partial file is valid:
//
//   [locator]
//   default_radius_km = 10.0
//   default_limit = 10
//
//   [notifications]
//   log_path = ".ecotrack/notifications.jsonl"

use std::fs;
use std::path::{Path, PathBuf};

use eco_geo::LocatorConfig;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Facility search defaults.
    #[serde(default)]
    pub locator: LocatorConfig,

    /// Where emitted notifications are recorded.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Append every notification to this JSONL file, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Load config from a TOML file. Fails if the file is missing or invalid.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path).map_err(|source| EngineError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Like [`EngineConfig::load`], but a missing file means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            tracing::debug!("no engine config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, EngineError> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| EngineError::ConfigError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config
            .locator
            .validate()
            .map_err(|e| EngineError::ConfigError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.notifications.log_path.is_none());
    }

    #[test]
    fn missing_file_is_an_error_for_load() {
        let dir = tempdir().unwrap();
        let result = EngineConfig::load(&dir.path().join("config.toml"));
        assert!(matches!(result, Err(EngineError::IoError { .. })));
    }

    #[test]
    fn sections_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[locator]\ndefault_radius_km = 2.5\n\n[notifications]\nlog_path = \"n.jsonl\"\n",
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.locator.default_radius_km, 2.5);
        assert_eq!(config.locator.default_limit, 10);
        assert_eq!(config.notifications.log_path, Some(PathBuf::from("n.jsonl")));
    }

    #[test]
    fn invalid_radius_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[locator]\ndefault_radius_km = -1.0\n").unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(EngineError::ConfigError { .. })
        ));
    }

    #[test]
    fn malformed_toml_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[locator\n").unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(EngineError::ConfigError { .. })
        ));
    }
}
