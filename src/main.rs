//! Shake Detector CLI
//!
//! Replays accelerometer samples through the shake detector.

use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use shake_detector::{
    collector::{ReplayConfig, ReplayInput, ReplaySource},
    config::Config,
    core::{Sensitivity, ShakeDetector, ShakeEvent, ShakeSink},
    monitor::ShakeMonitor,
    stats::create_shared_log,
    VERSION,
};
use tracing_subscriber::EnvFilter;

/// Epoch milliseconds for 2000-01-01; smaller timestamps are treated as relative.
const WALL_CLOCK_CUTOFF_MS: i64 = 946_684_800_000;

#[derive(Parser)]
#[command(name = "shake-detector")]
#[command(version = VERSION)]
#[command(about = "Detect shake gestures in accelerometer sample streams", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay samples through the detector
    Run {
        /// Sample file (CSV or JSON lines), or - for stdin
        #[arg(long, short, default_value = "-")]
        input: String,

        /// Sensitivity: high, normal, low, custom, custom:<n> or <n>
        #[arg(long, short)]
        sensitivity: Option<Sensitivity>,

        /// Pace replay by sample timestamps
        #[arg(long)]
        realtime: bool,

        /// Print shake events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config,

    /// Persist the default sensitivity
    SetSensitivity {
        /// high, normal, low, custom, custom:<n> or <n>
        sensitivity: Sensitivity,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            input,
            sensitivity,
            realtime,
            json,
        } => {
            cmd_run(&input, sensitivity, realtime, json);
        }
        Commands::Config => {
            cmd_config();
        }
        Commands::SetSensitivity { sensitivity } => {
            cmd_set_sensitivity(sensitivity);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Prints each shake to stdout.
struct ConsoleSink {
    json: bool,
}

impl ShakeSink for ConsoleSink {
    fn on_shake(&mut self, event: &ShakeEvent) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "could not serialize shake event"),
            }
        } else {
            println!(
                "[{}] Shake detected (speed {:.0}, {} forceful samples)",
                format_timestamp(event.timestamp),
                event.speed,
                event.shake_count
            );
        }
    }
}

fn format_timestamp(timestamp: i64) -> String {
    if timestamp >= WALL_CLOCK_CUTOFF_MS {
        if let Some(time) = Utc.timestamp_millis_opt(timestamp).single() {
            return time.format("%H:%M:%S%.3f").to_string();
        }
    }
    format!("{timestamp}ms")
}

fn cmd_run(input: &str, sensitivity: Option<Sensitivity>, realtime: bool, json: bool) {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config ({e}), using defaults");
            Config::default()
        }
    };

    let shake_config = match config.shake_config(sensitivity) {
        Ok(shake_config) => shake_config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let detector = match ShakeDetector::with_config(shake_config, ConsoleSink { json }) {
        Ok(detector) => detector,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let mut replay_config = ReplayConfig::from(&config.replay);
    replay_config.realtime |= realtime;
    let source = ReplaySource::new(ReplayInput::from_arg(input), replay_config);

    tracing::info!(
        input,
        sensitivity = %sensitivity.unwrap_or(config.sensitivity),
        force_threshold = shake_config.force_threshold,
        "starting shake detection"
    );

    let log = create_shared_log();
    let mut monitor = ShakeMonitor::with_log(source, detector, Arc::clone(&log));
    if let Err(e) = monitor.start() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(Arc::clone(&running));

    monitor.run(&running);
    monitor.stop();

    if running.load(Ordering::SeqCst) {
        tracing::debug!("input exhausted");
    } else {
        tracing::info!("interrupted");
    }

    log.record_rejected(monitor.source().rejected_count());

    // Keep stdout clean for JSON consumers
    if json {
        eprintln!("{}", log.summary());
    } else {
        println!();
        println!("{}", log.summary());
    }
}

fn cmd_config() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing config: {e}"),
    }
    match config.shake_config(None) {
        Ok(shake) => println!("\nEffective force threshold: {}", shake.force_threshold),
        Err(e) => eprintln!("\nWarning: {e}"),
    }
}

fn cmd_set_sensitivity(sensitivity: Sensitivity) {
    let mut config = Config::load().unwrap_or_default();
    config.sensitivity = sensitivity;

    if let Err(e) = config.shake_config(None) {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!(
        "Default sensitivity set to {sensitivity} (force threshold {}).",
        sensitivity.force_threshold()
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    }) {
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_arguments() {
        let cli = Cli::parse_from([
            "shake-detector",
            "run",
            "--input",
            "samples.csv",
            "--sensitivity",
            "custom:420",
            "--json",
        ]);
        match cli.command {
            Commands::Run {
                input,
                sensitivity,
                realtime,
                json,
            } => {
                assert_eq!(input, "samples.csv");
                assert_eq!(sensitivity, Some(Sensitivity::Custom(420)));
                assert!(!realtime);
                assert!(json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_rejects_unknown_sensitivity() {
        assert!(Cli::try_parse_from(["shake-detector", "set-sensitivity", "wild"]).is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(450), "450ms");
        assert_eq!(format_timestamp(1_700_000_000_123), "22:13:20.123");
    }
}
