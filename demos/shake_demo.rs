//! Demonstration of the shake detector.
//!
//! This example shows how to:
//! 1. Build a detector with a sensitivity and a closure sink
//! 2. Feed it synthetic accelerometer samples
//! 3. Drive the same detection through a replay source and monitor
//!
//! Run with: cargo run --example shake_demo

use std::io::Cursor;
use std::sync::atomic::AtomicBool;

use shake_detector::{ReplaySource, Sample, Sensitivity, ShakeDetector, ShakeEvent, ShakeMonitor};

/// Sampling period of the synthetic sensor.
const PERIOD_MS: i64 = 120;

/// One second at rest, one second of shaking, then rest again.
fn synthetic_samples() -> Vec<Sample> {
    (0..30)
        .map(|i| {
            let t = i * PERIOD_MS;
            let shaking = (8..17).contains(&i);
            let swing = if shaking {
                if i % 2 == 0 {
                    18.0
                } else {
                    -18.0
                }
            } else {
                // Small jitter around gravity
                (i % 3) as f32 * 0.05
            };
            Sample::new(swing, 0.1, 9.81, t)
        })
        .collect()
}

fn main() {
    println!("Shake Detector - Demo");
    println!("=====================");
    println!();

    for sensitivity in [Sensitivity::High, Sensitivity::Normal, Sensitivity::Low] {
        let mut shakes = Vec::new();
        {
            let mut detector = match ShakeDetector::new(sensitivity, |event: &ShakeEvent| {
                shakes.push(*event)
            }) {
                Ok(detector) => detector,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return;
                }
            };

            for sample in synthetic_samples() {
                detector.process(sample);
            }
        }

        println!(
            "{:>8} (threshold {:>3}): {} shake(s)",
            sensitivity.to_string(),
            sensitivity.force_threshold(),
            shakes.len()
        );
        for shake in &shakes {
            println!(
                "           at {}ms, speed {:.0}",
                shake.timestamp, shake.speed
            );
        }
    }

    println!();
    println!("Replaying the same samples through a monitor...");

    let csv: String = synthetic_samples()
        .iter()
        .map(|s| format!("{},{},{},{}\n", s.timestamp, s.x, s.y, s.z))
        .collect();
    let source = ReplaySource::from_reader(Cursor::new(csv));
    let detector = match ShakeDetector::new(Sensitivity::Normal, |event: &ShakeEvent| {
        println!("  Shake detected at {}ms", event.timestamp);
    }) {
        Ok(detector) => detector,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    let mut monitor = ShakeMonitor::new(source, detector);
    if let Err(e) = monitor.start() {
        eprintln!("Error starting replay: {e}");
        return;
    }
    monitor.run(&AtomicBool::new(true));
    monitor.stop();

    println!();
    println!("{}", monitor.log().summary());
}
