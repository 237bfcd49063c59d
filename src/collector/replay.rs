//! Replay of recorded accelerometer samples.
//!
//! Samples are read line by line from a file, stdin or any reader on a
//! background thread and pushed onto the collector channel. Each line is
//! either CSV (`timestamp,x,y,z`) or a JSON object with the same fields.
//! Blank lines, `#` comments and a CSV header are skipped. Malformed lines are
//! counted and logged, never fatal.

use crate::collector::types::Sample;
use crate::collector::{CollectorError, SensorSource, CHANNEL_CAPACITY};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// How long a blocked send waits before re-checking the stop flag.
const SEND_RETRY: Duration = Duration::from_millis(100);

/// Where replayed samples come from.
pub enum ReplayInput {
    Path(PathBuf),
    Stdin,
    Reader(Box<dyn BufRead + Send>),
}

impl ReplayInput {
    /// `-` means stdin, anything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            ReplayInput::Stdin
        } else {
            ReplayInput::Path(PathBuf::from(arg))
        }
    }
}

/// Replay pacing options.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Sleep for the gap between consecutive sample timestamps
    pub realtime: bool,
    /// Upper bound on a single pacing sleep
    pub max_gap: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            realtime: false,
            max_gap: Duration::from_secs(5),
        }
    }
}

/// A line that could not be turned into a sample.
#[derive(Debug, Error)]
pub enum SampleParseError {
    #[error("invalid JSON sample: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected 4 comma-separated fields (timestamp,x,y,z), got {0}")]
    FieldCount(usize),
    #[error("invalid {field} value '{value}'")]
    Number { field: &'static str, value: String },
}

/// Parse one input line. `Ok(None)` for lines that carry no sample.
pub fn parse_sample_line(line: &str) -> Result<Option<Sample>, SampleParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if line.starts_with('{') {
        return Ok(Some(serde_json::from_str(line)?));
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(SampleParseError::FieldCount(fields.len()));
    }
    if fields[0].eq_ignore_ascii_case("timestamp") {
        return Ok(None);
    }

    let timestamp = fields[0]
        .parse::<i64>()
        .map_err(|_| SampleParseError::Number {
            field: "timestamp",
            value: fields[0].to_string(),
        })?;
    let axis = |field: &'static str, value: &str| {
        value.parse::<f32>().map_err(|_| SampleParseError::Number {
            field,
            value: value.to_string(),
        })
    };

    Ok(Some(Sample::new(
        axis("x", fields[1])?,
        axis("y", fields[2])?,
        axis("z", fields[3])?,
        timestamp,
    )))
}

/// A sensor source that replays recorded samples.
pub struct ReplaySource {
    config: ReplayConfig,
    input: Option<ReplayInput>,
    sender: Option<Sender<Sample>>,
    receiver: Receiver<Sample>,
    running: Arc<AtomicBool>,
    rejected: Arc<AtomicU64>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(input: ReplayInput, config: ReplayConfig) -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        Self {
            config,
            input: Some(input),
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            rejected: Arc::new(AtomicU64::new(0)),
            thread_handle: None,
        }
    }

    /// Replay from an in-memory or custom reader as fast as possible.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self::new(ReplayInput::Reader(Box::new(reader)), ReplayConfig::default())
    }

    /// Number of lines skipped because they could not be parsed.
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    fn open(&mut self) -> Result<Box<dyn BufRead + Send>, CollectorError> {
        match self.input.take() {
            None => Err(CollectorError::Exhausted),
            Some(ReplayInput::Stdin) => Ok(Box::new(BufReader::new(std::io::stdin()))),
            Some(ReplayInput::Reader(reader)) => Ok(reader),
            Some(ReplayInput::Path(path)) => match File::open(&path) {
                Ok(file) => Ok(Box::new(BufReader::new(file))),
                Err(e) => {
                    let message = format!("{}: {e}", path.display());
                    // Keep the path so a later start can retry.
                    self.input = Some(ReplayInput::Path(path));
                    Err(CollectorError::Unavailable(message))
                }
            },
        }
    }
}

impl SensorSource for ReplaySource {
    fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }
        if self.sender.is_none() {
            return Err(CollectorError::Exhausted);
        }

        let reader = self.open()?;
        let sender = self.sender.take().ok_or(CollectorError::Exhausted)?;

        self.running.store(true, Ordering::SeqCst);
        tracing::info!(realtime = self.config.realtime, "replay started");

        let running = self.running.clone();
        let rejected = self.rejected.clone();
        let config = self.config.clone();

        let handle = thread::spawn(move || {
            replay_lines(reader, &sender, &running, &rejected, &config);
            running.store(false, Ordering::SeqCst);
            tracing::info!("replay finished");
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            // A reader blocked on stdin is left to exit on its own.
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn receiver(&self) -> &Receiver<Sample> {
        &self.receiver
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn replay_lines(
    reader: Box<dyn BufRead + Send>,
    sender: &Sender<Sample>,
    running: &AtomicBool,
    rejected: &AtomicU64,
    config: &ReplayConfig,
) {
    let mut previous: Option<i64> = None;

    for (index, line) in reader.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "replay input read failed");
                break;
            }
        };

        let sample = match parse_sample_line(&line) {
            Ok(Some(sample)) => sample,
            Ok(None) => continue,
            Err(e) => {
                rejected.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(line = index + 1, error = %e, "skipping malformed sample");
                continue;
            }
        };

        if config.realtime {
            if let Some(prev) = previous {
                let gap = sample.timestamp.saturating_sub(prev);
                if gap > 0 {
                    thread::sleep(Duration::from_millis(gap as u64).min(config.max_gap));
                }
            }
            previous = Some(sample.timestamp);
        }

        if !send(sender, sample, running) {
            break;
        }
    }
}

/// Push a sample, waiting while the channel is full. False once the consumer
/// is gone or the source was stopped.
fn send(sender: &Sender<Sample>, sample: Sample, running: &AtomicBool) -> bool {
    let mut pending = sample;
    loop {
        match sender.send_timeout(pending, SEND_RETRY) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(sample)) => {
                if !running.load(Ordering::SeqCst) {
                    return false;
                }
                pending = sample;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_csv_line() {
        let sample = parse_sample_line("150, 1.5, -2.0, 9.81").unwrap().unwrap();
        assert_eq!(sample.timestamp, 150);
        assert!((sample.x - 1.5).abs() < 1e-6);
        assert!((sample.y + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_json_line() {
        let sample = parse_sample_line(r#"{"timestamp": 7, "x": 0.0, "y": 1.0, "z": 2.0}"#)
            .unwrap()
            .unwrap();
        assert_eq!(sample, Sample::new(0.0, 1.0, 2.0, 7));
    }

    #[test]
    fn test_parse_skips_non_samples() {
        assert!(parse_sample_line("").unwrap().is_none());
        assert!(parse_sample_line("   ").unwrap().is_none());
        assert!(parse_sample_line("# recorded on a phone").unwrap().is_none());
        assert!(parse_sample_line("timestamp,x,y,z").unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(matches!(
            parse_sample_line("1,2,3"),
            Err(SampleParseError::FieldCount(3))
        ));
        assert!(matches!(
            parse_sample_line("abc,1,2,3"),
            Err(SampleParseError::Number { field: "timestamp", .. })
        ));
        assert!(matches!(
            parse_sample_line("1,2,oops,3"),
            Err(SampleParseError::Number { field: "y", .. })
        ));
        assert!(matches!(
            parse_sample_line("{\"x\": 1}"),
            Err(SampleParseError::Json(_))
        ));
    }

    #[test]
    fn test_parse_accepts_non_finite_axes() {
        let sample = parse_sample_line("0,NaN,inf,0").unwrap().unwrap();
        assert!(!sample.is_finite());
    }

    #[test]
    fn test_replay_from_reader() {
        let input = "# header comment\n0,0,0,0\nbroken line\n150,40,0,0\n\n300,80,0,0\n";
        let mut source = ReplaySource::from_reader(Cursor::new(input.to_string()));
        source.start().unwrap();

        let samples: Vec<Sample> = source.receiver().iter().collect();
        let timestamps: Vec<i64> = samples.iter().map(|s| s.timestamp).collect();

        assert_eq!(timestamps, vec![0, 150, 300]);
        assert_eq!(source.rejected_count(), 1);
        source.stop();
        assert!(!source.is_running());
    }

    #[test]
    fn test_replay_cannot_restart_consumed_input() {
        let mut source = ReplaySource::from_reader(Cursor::new("0,0,0,0\n".to_string()));
        source.start().unwrap();
        let _: Vec<Sample> = source.receiver().iter().collect();

        assert!(matches!(
            source.start(),
            Err(CollectorError::AlreadyRunning) | Err(CollectorError::Exhausted)
        ));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let mut source = ReplaySource::new(
            ReplayInput::Path(PathBuf::from("/nonexistent/shake/samples.csv")),
            ReplayConfig::default(),
        );
        let err = source.start().unwrap_err();
        assert!(matches!(err, CollectorError::Unavailable(_)));
        assert!(!source.is_running());

        // The path is kept, so the error repeats rather than turning into Exhausted.
        assert!(matches!(source.start(), Err(CollectorError::Unavailable(_))));
    }

    #[test]
    fn test_replay_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,x,y,z").unwrap();
        writeln!(file, "0,0.1,0.2,9.8").unwrap();
        writeln!(file, r#"{{"timestamp":200,"x":5.0,"y":0.0,"z":9.8}}"#).unwrap();
        file.flush().unwrap();

        let mut source = ReplaySource::new(
            ReplayInput::from_arg(file.path().to_str().unwrap()),
            ReplayConfig::default(),
        );
        source.start().unwrap();
        let samples: Vec<Sample> = source.receiver().iter().collect();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].timestamp, 200);
        assert_eq!(source.rejected_count(), 0);
    }

    #[test]
    fn test_input_from_arg() {
        assert!(matches!(ReplayInput::from_arg("-"), ReplayInput::Stdin));
        assert!(matches!(ReplayInput::from_arg("a.csv"), ReplayInput::Path(_)));
    }
}
