//! Glue between a sample source and a shake detector.
//!
//! The monitor owns the source lifecycle and forwards each received sample to
//! the detector on the calling thread. The detector never sees the source.

use crate::collector::{CollectorError, SensorSource};
use crate::core::detector::{ShakeDetector, ShakeSink};
use crate::core::engine::ShakeEvent;
use crate::stats::{create_shared_log, SharedDetectionLog};
use crossbeam_channel::RecvTimeoutError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

/// How long `run` waits for a sample before re-checking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Collector(#[from] CollectorError),
}

/// Outcome of a single [`ShakeMonitor::pump`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pump {
    /// A sample was processed, possibly confirming a shake
    Sample(Option<ShakeEvent>),
    /// Nothing arrived within the timeout
    Idle,
    /// The source has no more samples
    Finished,
}

pub struct ShakeMonitor<S, K> {
    source: S,
    detector: ShakeDetector<K>,
    log: SharedDetectionLog,
}

impl<S, K> ShakeMonitor<S, K>
where
    S: SensorSource,
    K: ShakeSink,
{
    pub fn new(source: S, detector: ShakeDetector<K>) -> Self {
        Self::with_log(source, detector, create_shared_log())
    }

    /// Create a monitor that records into an existing log.
    pub fn with_log(source: S, detector: ShakeDetector<K>, log: SharedDetectionLog) -> Self {
        Self {
            source,
            detector,
            log,
        }
    }

    pub fn start(&mut self) -> Result<(), MonitorError> {
        self.source.start()?;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.source.stop();
    }

    /// Receive at most one sample and feed it to the detector.
    pub fn pump(&mut self, timeout: Duration) -> Pump {
        match self.source.receiver().recv_timeout(timeout) {
            Ok(sample) => {
                self.log.record_sample();
                let event = self.detector.process(sample);
                if event.is_some() {
                    self.log.record_shake();
                }
                Pump::Sample(event)
            }
            Err(RecvTimeoutError::Timeout) => Pump::Idle,
            Err(RecvTimeoutError::Disconnected) => Pump::Finished,
        }
    }

    /// Pump until `running` is cleared or the source finishes. Returns the
    /// number of shakes detected during this call.
    pub fn run(&mut self, running: &AtomicBool) -> u64 {
        let mut shakes = 0;
        while running.load(Ordering::SeqCst) {
            match self.pump(POLL_INTERVAL) {
                Pump::Sample(Some(_)) => shakes += 1,
                Pump::Sample(None) | Pump::Idle => {}
                Pump::Finished => {
                    tracing::debug!("sample source finished");
                    break;
                }
            }
        }
        shakes
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn detector(&self) -> &ShakeDetector<K> {
        &self.detector
    }

    pub fn log(&self) -> &SharedDetectionLog {
        &self.log
    }

    /// Stop the source and hand back the detector.
    pub fn into_detector(mut self) -> ShakeDetector<K> {
        self.source.stop();
        self.detector
    }
}
