//! Core shake detection.
//!
//! This module contains:
//! - Thresholds and the sensitivity selector
//! - The streaming shake engine
//! - The detector that pairs an engine with its sink

pub mod detector;
pub mod engine;
pub mod settings;

// Re-export commonly used types
pub use detector::{ShakeDetector, ShakeSink};
pub use engine::{EngineState, ShakeEngine, ShakeEvent};
pub use settings::{ConfigurationError, ParseSensitivityError, Sensitivity, ShakeConfig};
