//! In-memory detection statistics.
//!
//! Counters are updated from the sampling thread and may be read from any
//! other thread. Nothing is written to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Detection counters for the current run.
#[derive(Debug)]
pub struct DetectionLog {
    /// Samples delivered to the detector
    samples_received: AtomicU64,
    /// Input lines or readings dropped before reaching the detector
    samples_rejected: AtomicU64,
    /// Shake events emitted
    shakes_detected: AtomicU64,
    /// Run start time
    session_start: DateTime<Utc>,
}

impl DetectionLog {
    pub fn new() -> Self {
        Self {
            samples_received: AtomicU64::new(0),
            samples_rejected: AtomicU64::new(0),
            shakes_detected: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    pub fn record_sample(&self) {
        self.samples_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self, count: u64) {
        self.samples_rejected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_shake(&self) {
        self.shakes_detected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> DetectionStats {
        DetectionStats {
            samples_received: self.samples_received.load(Ordering::Relaxed),
            samples_rejected: self.samples_rejected.load(Ordering::Relaxed),
            shakes_detected: self.shakes_detected.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Detection Statistics:\n\
             - Samples processed: {}\n\
             - Samples rejected: {}\n\
             - Shakes detected: {}\n\
             - Session duration: {} seconds",
            stats.samples_received,
            stats.samples_rejected,
            stats.shakes_detected,
            stats.session_duration_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.samples_received.store(0, Ordering::Relaxed);
        self.samples_rejected.store(0, Ordering::Relaxed);
        self.shakes_detected.store(0, Ordering::Relaxed);
    }
}

impl Default for DetectionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of detection statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionStats {
    pub samples_received: u64,
    pub samples_rejected: u64,
    pub shakes_detected: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared detection log.
pub type SharedDetectionLog = Arc<DetectionLog>;

/// Create a new shared detection log.
pub fn create_shared_log() -> SharedDetectionLog {
    Arc::new(DetectionLog::new())
}
