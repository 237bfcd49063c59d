//! Shake engine bundled with the sink it notifies.

use crate::collector::types::Sample;
use crate::core::engine::{ShakeEngine, ShakeEvent};
use crate::core::settings::{ConfigurationError, Sensitivity, ShakeConfig};

/// Receiver of shake notifications.
///
/// Called synchronously, at most once per debounced gesture, on the thread
/// that fed the triggering sample.
pub trait ShakeSink {
    fn on_shake(&mut self, event: &ShakeEvent);
}

impl<F> ShakeSink for F
where
    F: FnMut(&ShakeEvent),
{
    fn on_shake(&mut self, event: &ShakeEvent) {
        self(event)
    }
}

/// A [`ShakeEngine`] that delivers its events to a [`ShakeSink`].
pub struct ShakeDetector<K> {
    engine: ShakeEngine,
    sink: K,
}

impl<K: ShakeSink> ShakeDetector<K> {
    /// Create a detector with default timings for `sensitivity`.
    pub fn new(sensitivity: Sensitivity, sink: K) -> Result<Self, ConfigurationError> {
        Self::with_config(ShakeConfig::from_sensitivity(sensitivity), sink)
    }

    /// Create a detector with explicit thresholds.
    pub fn with_config(config: ShakeConfig, sink: K) -> Result<Self, ConfigurationError> {
        Ok(Self {
            engine: ShakeEngine::new(config)?,
            sink,
        })
    }

    /// Feed one sample; the sink has already been notified when this returns
    /// `Some`.
    pub fn process(&mut self, sample: Sample) -> Option<ShakeEvent> {
        let event = self.engine.ingest(sample)?;
        self.sink.on_shake(&event);
        Some(event)
    }

    pub fn engine(&self) -> &ShakeEngine {
        &self.engine
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }
}
