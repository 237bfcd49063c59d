//! Sample sources for the shake detector.
//!
//! A source owns its own lifecycle (start/stop) and delivers samples over a
//! bounded channel. The detector itself never touches a source.

pub mod replay;
pub mod types;

use crossbeam_channel::Receiver;
use thiserror::Error;

// Re-export commonly used types
pub use replay::{parse_sample_line, ReplayConfig, ReplayInput, ReplaySource};
pub use types::Sample;

/// Capacity of the channel between a source thread and its consumer.
pub const CHANNEL_CAPACITY: usize = 10_000;

/// Errors that can occur while starting a source.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// No usable sample input exists on this host
    #[error("accelerometer input unavailable: {0}")]
    Unavailable(String),
    #[error("collector is already running")]
    AlreadyRunning,
    /// The input was consumed by an earlier run
    #[error("collector input has already been consumed")]
    Exhausted,
}

/// Something that pushes accelerometer samples.
pub trait SensorSource {
    /// Begin delivering samples.
    fn start(&mut self) -> Result<(), CollectorError>;

    /// Stop delivering samples. Samples already queued stay readable.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Channel the samples arrive on. Disconnects once the source is finished.
    fn receiver(&self) -> &Receiver<Sample>;
}
