//! Streaming shake detection.
//!
//! The engine turns a stream of accelerometer samples into debounced shake
//! events. It keeps O(1) state, performs no I/O and never blocks, so it can be
//! driven directly from whatever thread delivers sensor readings.
//!
//! Per sample:
//! 1. An unfinished streak older than the shake timeout is forgotten
//! 2. Samples too close to the last accepted one are ignored
//! 3. The change in axis sum over elapsed time gives a speed
//! 4. Enough forceful speeds in a row, outside the debounce window, emit a shake

use crate::collector::types::Sample;
use crate::core::settings::{ConfigurationError, Sensitivity, ShakeConfig};
use serde::{Deserialize, Serialize};

/// Speed scale applied to the axis-sum delta per millisecond.
const SPEED_SCALE: f64 = 10_000.0;

/// A confirmed shake gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeEvent {
    /// Timestamp of the sample that confirmed the shake
    pub timestamp: i64,
    /// Speed computed for that sample
    pub speed: f64,
    /// Length of the streak that triggered the shake
    pub shake_count: u32,
}

/// Mutable detection state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineState {
    /// Last sample that passed the time gate
    pub last_sample: Option<Sample>,
    /// Timestamp of the last forceful sample
    pub last_force_time: Option<i64>,
    /// Timestamp of the last emitted shake
    pub last_shake_time: Option<i64>,
    /// Forceful samples since the streak was last reset
    pub consecutive_shake_count: u32,
}

/// Shake detector state machine.
///
/// Not synchronized: `ingest` takes `&mut self`, so callers sharing an engine
/// across threads have to serialize access themselves.
#[derive(Debug, Clone)]
pub struct ShakeEngine {
    config: ShakeConfig,
    state: EngineState,
}

impl ShakeEngine {
    /// Create an engine, rejecting any non-positive threshold or count.
    pub fn new(config: ShakeConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            state: EngineState::default(),
        })
    }

    /// Create an engine with default timings for the given sensitivity.
    pub fn with_sensitivity(sensitivity: Sensitivity) -> Result<Self, ConfigurationError> {
        Self::new(ShakeConfig::from_sensitivity(sensitivity))
    }

    pub fn config(&self) -> &ShakeConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn consecutive_shake_count(&self) -> u32 {
        self.state.consecutive_shake_count
    }

    /// Forget all history, as if freshly constructed.
    pub fn reset(&mut self) {
        self.state = EngineState::default();
    }

    /// Feed one sample, returning a shake if this sample confirmed one.
    pub fn ingest(&mut self, sample: Sample) -> Option<ShakeEvent> {
        let now = sample.timestamp;
        let config = self.config;
        let state = &mut self.state;

        let streak_expired = state
            .last_force_time
            .map_or(true, |t| now.saturating_sub(t) > config.shake_timeout_ms);
        if streak_expired && state.consecutive_shake_count > 0 {
            tracing::trace!(now, count = state.consecutive_shake_count, "shake streak decayed");
            state.consecutive_shake_count = 0;
        }

        let last = match state.last_sample {
            Some(last) => last,
            None => {
                state.last_sample = Some(sample);
                return None;
            }
        };

        // Also covers diff <= 0, so the division below never sees a zero.
        let diff = now.saturating_sub(last.timestamp);
        if diff <= config.time_threshold_ms {
            tracing::trace!(now, diff, "sample inside time threshold");
            return None;
        }

        let speed = (sample.axis_sum() - last.axis_sum()).abs() / diff as f64 * SPEED_SCALE;
        let mut event = None;

        // NaN compares false; infinite speeds are excluded explicitly.
        if speed.is_finite() && speed > f64::from(config.force_threshold) {
            state.consecutive_shake_count = state.consecutive_shake_count.saturating_add(1);

            let debounced = state
                .last_shake_time
                .map_or(true, |t| now.saturating_sub(t) > config.shake_duration_ms);
            if state.consecutive_shake_count >= config.required_shake_count && debounced {
                event = Some(ShakeEvent {
                    timestamp: now,
                    speed,
                    shake_count: state.consecutive_shake_count,
                });
                tracing::debug!(now, speed, count = state.consecutive_shake_count, "shake detected");
                state.last_shake_time = Some(now);
                state.consecutive_shake_count = 0;
            }

            state.last_force_time = Some(now);
        }

        state.last_sample = Some(sample);
        event
    }
}
