//! End-to-end tests for shake detection through the public API.

use std::io::Cursor;
use std::sync::atomic::AtomicBool;

use shake_detector::{
    ReplaySource, Sample, Sensitivity, ShakeConfig, ShakeDetector, ShakeEngine, ShakeEvent,
    ShakeMonitor,
};

/// Samples whose axis sums change by `delta` every `step_ms`.
fn ramp(start: i64, step_ms: i64, count: usize, delta: f32) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            let sum = i as f32 * delta;
            // Spread the sum over the axes like a real reading would be
            Sample::new(sum * 0.5, sum * 0.25, sum * 0.25 + 9.81, start + i as i64 * step_ms)
        })
        .collect()
}

fn collect_events(engine: &mut ShakeEngine, samples: &[Sample]) -> Vec<ShakeEvent> {
    samples.iter().filter_map(|s| engine.ingest(*s)).collect()
}

#[test]
fn test_default_scenario_emits_once_at_450() {
    let mut engine = ShakeEngine::new(ShakeConfig::default()).unwrap();
    let samples = ramp(0, 150, 4, 40.0);

    let mut emitted = Vec::new();
    for sample in &samples {
        if let Some(event) = engine.ingest(*sample) {
            emitted.push(event);
            assert_eq!(engine.consecutive_shake_count(), 0);
        }
    }

    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].timestamp, 450);
}

#[test]
fn test_widely_spaced_deltas_never_build_a_streak() {
    let mut engine = ShakeEngine::new(ShakeConfig::default()).unwrap();
    for sample in ramp(0, 700, 20, 40.0) {
        assert!(engine.ingest(sample).is_none());
        assert!(engine.consecutive_shake_count() <= 1);
    }
}

#[test]
fn test_continuous_shaking_respects_debounce() {
    let mut engine = ShakeEngine::new(ShakeConfig::default()).unwrap();
    let events = collect_events(&mut engine, &ramp(0, 150, 40, 40.0));

    assert!(events.len() > 1);
    for pair in events.windows(2) {
        assert!(pair[1].timestamp - pair[0].timestamp > 1000);
    }
}

#[test]
fn test_identical_inputs_produce_identical_events() {
    let samples: Vec<Sample> = ramp(0, 150, 12, 40.0)
        .into_iter()
        .chain(ramp(5_000, 110, 12, -25.0))
        .chain(ramp(9_000, 130, 12, 60.0))
        .collect();

    let config = ShakeConfig::from_sensitivity(Sensitivity::High);
    let mut first = ShakeEngine::new(config).unwrap();
    let mut second = ShakeEngine::new(config).unwrap();

    let a = collect_events(&mut first, &samples);
    let b = collect_events(&mut second, &samples);

    assert!(!a.is_empty());
    assert_eq!(a, b);
    assert_eq!(first.state(), second.state());
}

#[test]
fn test_non_finite_samples_are_harmless() {
    let mut engine = ShakeEngine::new(ShakeConfig::default()).unwrap();
    let mut samples = ramp(0, 150, 3, 40.0);
    samples.push(Sample::new(f32::NAN, f32::NAN, f32::NAN, 450));
    samples.push(Sample::new(f32::INFINITY, 0.0, 0.0, 600));
    samples.push(Sample::new(f32::NEG_INFINITY, f32::INFINITY, 0.0, 750));

    assert!(collect_events(&mut engine, &samples).is_empty());
}

#[test]
fn test_replay_pipeline_matches_direct_ingest() {
    let samples = ramp(1_000, 150, 16, 40.0);
    let csv: String = samples
        .iter()
        .map(|s| format!("{},{},{},{}\n", s.timestamp, s.x, s.y, s.z))
        .collect();

    let mut engine = ShakeEngine::with_sensitivity(Sensitivity::Normal).unwrap();
    let expected: Vec<i64> = collect_events(&mut engine, &samples)
        .iter()
        .map(|e| e.timestamp)
        .collect();

    let mut seen = Vec::new();
    let detector =
        ShakeDetector::new(Sensitivity::Normal, |e: &ShakeEvent| seen.push(e.timestamp)).unwrap();
    let mut monitor = ShakeMonitor::new(ReplaySource::from_reader(Cursor::new(csv)), detector);
    monitor.start().unwrap();
    monitor.run(&AtomicBool::new(true));

    let stats = monitor.log().stats();
    assert_eq!(stats.samples_received, samples.len() as u64);
    assert_eq!(stats.shakes_detected, expected.len() as u64);

    drop(monitor.into_detector());
    assert_eq!(seen, expected);
}
