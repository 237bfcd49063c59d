//! Configuration for the shake detector CLI.

use crate::collector::ReplayConfig;
use crate::core::settings::{
    ConfigurationError, Sensitivity, ShakeConfig, SHAKE_COUNT, SHAKE_DURATION_MS,
    SHAKE_TIMEOUT_MS, TIME_THRESHOLD_MS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main configuration for the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sensitivity used when none is given on the command line
    pub sensitivity: Sensitivity,

    /// Minimum gap between accepted samples, in milliseconds
    pub time_threshold_ms: i64,

    /// Gap after which an unfinished streak is forgotten, in milliseconds
    pub shake_timeout_ms: i64,

    /// Debounce window between two shakes, in milliseconds
    pub shake_duration_ms: i64,

    /// Forceful samples needed to confirm a shake
    pub required_shake_count: u32,

    /// Replay pacing
    pub replay: ReplaySettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Normal,
            time_threshold_ms: TIME_THRESHOLD_MS,
            shake_timeout_ms: SHAKE_TIMEOUT_MS,
            shake_duration_ms: SHAKE_DURATION_MS,
            required_shake_count: SHAKE_COUNT,
            replay: ReplaySettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shake-detector")
            .join("config.json")
    }

    /// Engine thresholds, with `sensitivity` overriding the configured one.
    pub fn shake_config(
        &self,
        sensitivity: Option<Sensitivity>,
    ) -> Result<ShakeConfig, ConfigurationError> {
        let sensitivity = sensitivity.unwrap_or(self.sensitivity);
        let config = ShakeConfig {
            time_threshold_ms: self.time_threshold_ms,
            shake_timeout_ms: self.shake_timeout_ms,
            shake_duration_ms: self.shake_duration_ms,
            required_shake_count: self.required_shake_count,
            ..ShakeConfig::from_sensitivity(sensitivity)
        };
        config.validate()?;
        Ok(config)
    }
}

/// Pacing options for replayed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Sleep between samples according to their timestamps
    pub realtime: bool,

    /// Longest single pause during real-time replay
    #[serde(with = "duration_millis")]
    pub max_gap: Duration,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        let defaults = ReplayConfig::default();
        Self {
            realtime: defaults.realtime,
            max_gap: defaults.max_gap,
        }
    }
}

impl From<&ReplaySettings> for ReplayConfig {
    fn from(settings: &ReplaySettings) -> Self {
        Self {
            realtime: settings.realtime,
            max_gap: settings.max_gap,
        }
    }
}

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(serde_json::Error),
}

/// Serde support for Duration as whole milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sensitivity, Sensitivity::Normal);
        assert_eq!(config.shake_config(None).unwrap(), ShakeConfig::default());
        assert!(!config.replay.realtime);
    }

    #[test]
    fn test_sensitivity_override() {
        let config = Config::default();
        let shake = config.shake_config(Some(Sensitivity::High)).unwrap();
        assert_eq!(shake.force_threshold, Sensitivity::High.force_threshold());
        assert_eq!(shake.required_shake_count, 3);
    }

    #[test]
    fn test_invalid_thresholds_are_reported() {
        let config = Config {
            shake_duration_ms: 0,
            ..Config::default()
        };
        let err = config.shake_config(None).unwrap_err();
        assert_eq!(err.field, "shake_duration_ms");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            sensitivity: Sensitivity::Custom(720),
            required_shake_count: 4,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"sensitivity": "low", "replay": {"realtime": true}}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.sensitivity, Sensitivity::Low);
        assert!(loaded.replay.realtime);
        assert_eq!(loaded.replay.max_gap, Duration::from_secs(5));
        assert_eq!(loaded.shake_timeout_ms, 500);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
