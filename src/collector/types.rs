//! Accelerometer sample types.
//!
//! A sample carries the three axis readings and the millisecond timestamp the
//! source attached to it. Nothing else about the device is recorded.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One 3-axis accelerometer reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Acceleration along the x axis
    pub x: f32,
    /// Acceleration along the y axis
    pub y: f32,
    /// Acceleration along the z axis
    pub z: f32,
    /// Milliseconds on the source's clock (epoch millis for wall-clock sources)
    pub timestamp: i64,
}

impl Sample {
    pub fn new(x: f32, y: f32, z: f32, timestamp: i64) -> Self {
        Self { x, y, z, timestamp }
    }

    /// Create a sample stamped with the current wall-clock time.
    pub fn now(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, Utc::now().timestamp_millis())
    }

    /// Sum of the three axes in double precision.
    pub fn axis_sum(&self) -> f64 {
        f64::from(self.x) + f64::from(self.y) + f64::from(self.z)
    }

    /// Whether every axis reading is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Interpret the timestamp as epoch milliseconds.
    pub fn wall_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
