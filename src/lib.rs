//! Shake Detector - debounced shake-gesture detection for accelerometer streams.
//!
//! This library turns a stream of 3-axis accelerometer samples into discrete
//! shake events, reporting each physical shake exactly once.
//!
//! # Detection Model
//!
//! - **Time gate**: samples closer than the time threshold to the last accepted
//!   sample are ignored
//! - **Speed**: the change in axis sum per millisecond, scaled by 10 000
//! - **Streak**: a shake needs several forceful samples in a row; the streak is
//!   forgotten after a quiet timeout
//! - **Debounce**: two shakes are never reported within the shake duration
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       Shake Detector                       │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐      │
//! │  │   Source    │──▶│   Monitor   │──▶│   Engine    │      │
//! │  │  (replay)   │   │ (lifecycle) │   │  (ingest)   │      │
//! │  └─────────────┘   └─────────────┘   └─────────────┘      │
//! │                           │                 │              │
//! │                           ▼                 ▼              │
//! │                    ┌─────────────┐   ┌─────────────┐      │
//! │                    │  Detection  │   │    Sink     │      │
//! │                    │    Stats    │   │  on_shake   │      │
//! │                    └─────────────┘   └─────────────┘      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use shake_detector::{Sample, Sensitivity, ShakeDetector, ShakeEvent};
//!
//! let mut detector = ShakeDetector::new(Sensitivity::Normal, |event: &ShakeEvent| {
//!     println!("shake at {}", event.timestamp);
//! })
//! .expect("valid sensitivity");
//!
//! for (i, sum) in [0.0, 40.0, 80.0, 120.0].into_iter().enumerate() {
//!     detector.process(Sample::new(sum, 0.0, 0.0, i as i64 * 150));
//! }
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod monitor;
pub mod stats;

// Re-export key types at crate root for convenience
pub use collector::{CollectorError, ReplaySource, Sample, SensorSource};
pub use config::{Config, ConfigError};
pub use core::{
    ConfigurationError, EngineState, Sensitivity, ShakeConfig, ShakeDetector, ShakeEngine,
    ShakeEvent, ShakeSink,
};
pub use monitor::{MonitorError, Pump, ShakeMonitor};
pub use stats::{DetectionLog, DetectionStats, SharedDetectionLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
