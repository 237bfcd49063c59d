//! Detection thresholds and the sensitivity selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Force threshold used by [`Sensitivity::Normal`].
pub const NORMAL_FORCE_THRESHOLD: u32 = 350;
/// Force threshold used by [`Sensitivity::High`].
pub const HIGH_FORCE_THRESHOLD: u32 = 250;
/// Force threshold used by [`Sensitivity::Low`].
pub const LOW_FORCE_THRESHOLD: u32 = 500;
/// Threshold a bare `custom` sensitivity starts from.
pub const DEFAULT_CUSTOM_THRESHOLD: u32 = 650;

/// Minimum gap between two samples before a delta is computed.
pub const TIME_THRESHOLD_MS: i64 = 100;
/// Maximum gap between forceful samples before the streak decays.
pub const SHAKE_TIMEOUT_MS: i64 = 500;
/// Minimum gap between two emitted shakes.
pub const SHAKE_DURATION_MS: i64 = 1000;
/// Forceful samples needed to confirm a shake.
pub const SHAKE_COUNT: u32 = 3;

/// Shake sensitivity. Higher sensitivity means less force is needed to
/// trigger a shake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    High,
    #[default]
    Normal,
    Low,
    /// Explicit force threshold
    Custom(u32),
}

impl Sensitivity {
    /// `Custom` with the default custom threshold.
    pub fn default_custom() -> Self {
        Sensitivity::Custom(DEFAULT_CUSTOM_THRESHOLD)
    }

    /// Speed a delta must exceed to count as forceful.
    pub fn force_threshold(&self) -> u32 {
        match self {
            Sensitivity::High => HIGH_FORCE_THRESHOLD,
            Sensitivity::Normal => NORMAL_FORCE_THRESHOLD,
            Sensitivity::Low => LOW_FORCE_THRESHOLD,
            Sensitivity::Custom(threshold) => *threshold,
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensitivity::High => write!(f, "high"),
            Sensitivity::Normal => write!(f, "normal"),
            Sensitivity::Low => write!(f, "low"),
            Sensitivity::Custom(threshold) => write!(f, "custom:{threshold}"),
        }
    }
}

/// Error returned when a sensitivity string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sensitivity '{0}' (expected high, normal, low, custom, custom:<n> or <n>)")]
pub struct ParseSensitivityError(pub String);

impl FromStr for Sensitivity {
    type Err = ParseSensitivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        let parse_threshold = |raw: &str| {
            raw.trim()
                .parse::<u32>()
                .map(Sensitivity::Custom)
                .map_err(|_| ParseSensitivityError(s.to_string()))
        };

        match value.as_str() {
            "high" => Ok(Sensitivity::High),
            "normal" => Ok(Sensitivity::Normal),
            "low" => Ok(Sensitivity::Low),
            "custom" => Ok(Sensitivity::default_custom()),
            other => match other.strip_prefix("custom:") {
                Some(raw) => parse_threshold(raw),
                None => parse_threshold(other),
            },
        }
    }
}

/// A threshold or count that must be positive was not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid shake configuration: {field} must be positive, got {value}")]
pub struct ConfigurationError {
    pub field: &'static str,
    pub value: i64,
}

/// Thresholds driving a [`ShakeEngine`](super::engine::ShakeEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShakeConfig {
    /// Minimum computed speed for a delta to count as forceful
    pub force_threshold: u32,
    /// Minimum gap between accepted samples, in milliseconds
    pub time_threshold_ms: i64,
    /// Gap after which an unfinished streak is forgotten, in milliseconds
    pub shake_timeout_ms: i64,
    /// Debounce window between two emitted shakes, in milliseconds
    pub shake_duration_ms: i64,
    /// Consecutive forceful deltas required to emit a shake
    pub required_shake_count: u32,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self::from_sensitivity(Sensitivity::Normal)
    }
}

impl ShakeConfig {
    /// Default timings with the force threshold picked by `sensitivity`.
    pub fn from_sensitivity(sensitivity: Sensitivity) -> Self {
        Self {
            force_threshold: sensitivity.force_threshold(),
            time_threshold_ms: TIME_THRESHOLD_MS,
            shake_timeout_ms: SHAKE_TIMEOUT_MS,
            shake_duration_ms: SHAKE_DURATION_MS,
            required_shake_count: SHAKE_COUNT,
        }
    }

    /// Reject any non-positive threshold or count.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let checks = [
            ("force_threshold", i64::from(self.force_threshold)),
            ("time_threshold_ms", self.time_threshold_ms),
            ("shake_timeout_ms", self.shake_timeout_ms),
            ("shake_duration_ms", self.shake_duration_ms),
            ("required_shake_count", i64::from(self.required_shake_count)),
        ];

        match checks.into_iter().find(|(_, value)| *value <= 0) {
            Some((field, value)) => Err(ConfigurationError { field, value }),
            None => Ok(()),
        }
    }
}
