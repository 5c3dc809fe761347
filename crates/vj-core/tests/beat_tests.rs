use vj_core::beat::{estimate_bpm, Detection};
use vj_core::{BeatClock, BpmDetector, TapTempo};

#[test]
fn stalled_frame_fires_a_single_edge() {
    let mut clock = BeatClock::new(0.0);
    assert!(!clock.tick(100.0));
    assert!(clock.tick(10_000.0));
    assert_eq!(clock.last_beat_index(), 20);
    assert!(!clock.tick(10_016.0));
    assert!(clock.tick(10_500.0));
}

#[test]
fn bpm_change_keeps_phase() {
    let mut clock = BeatClock::new(0.0);
    assert!(clock.tick(750.0));
    assert!(clock.set_bpm(60.0, 750.0));
    assert!((clock.phase(750.0) - 1.5).abs() < 1e-9);
    assert!((clock.time_to_next_beat(750.0) - 500.0).abs() < 1e-6);
    assert!(!clock.tick(800.0));
    assert!(clock.tick(1250.0));
    assert_eq!(clock.last_beat_index(), 2);
}

#[test]
fn out_of_range_bpm_is_rejected() {
    let mut clock = BeatClock::new(0.0);
    assert!(!clock.set_bpm(40.0, 0.0));
    assert!(!clock.set_bpm(240.0, 0.0));
    assert!(!clock.set_bpm(f32::NAN, 0.0));
    assert_eq!(clock.bpm(), 120.0);
}

#[test]
fn four_taps_at_half_second_give_120() {
    let mut tap = TapTempo::new();
    assert_eq!(tap.tap(0.0), None);
    tap.tap(500.0);
    tap.tap(1000.0);
    let bpm = tap.tap(1500.0).unwrap();
    assert!((bpm - 120.0).abs() < 1e-3);
}

#[test]
fn long_gap_starts_a_new_sequence() {
    let mut tap = TapTempo::new();
    tap.tap(0.0);
    tap.tap(250.0);
    assert_eq!(tap.tap(2251.0), None);
    assert_eq!(tap.tap_count(), 1);
    let bpm = tap.tap(2751.0).unwrap();
    assert!((bpm - 120.0).abs() < 1e-3);
}

#[test]
fn tap_history_is_bounded() {
    let mut tap = TapTempo::new();
    // slow taps first, then fast ones push them out of the window
    for t in [0.0, 1000.0, 2000.0] {
        tap.tap(t);
    }
    let mut last = None;
    for i in 1..=5 {
        last = tap.tap(2000.0 + i as f64 * 400.0);
    }
    assert_eq!(tap.tap_count(), 6);
    assert!((last.unwrap() - 150.0).abs() < 1e-3);
}

fn pulse_train(beat_ms: f64, secs: f64) -> Vec<(f64, f32)> {
    let frames = (secs * 60.0) as usize;
    (0..=frames)
        .map(|k| {
            let t = k as f64 * 1000.0 / 60.0;
            let e = if t % beat_ms < 50.0 { 1.0 } else { 0.1 };
            (t, e)
        })
        .collect()
}

#[test]
fn onset_median_recovers_tempo() {
    let bpm = estimate_bpm(&pulse_train(500.0, 8.0)).unwrap();
    assert!((bpm - 120.0).abs() < 1.0);
}

#[test]
fn slow_pulses_fold_up_an_octave() {
    let bpm = estimate_bpm(&pulse_train(1500.0, 8.0)).unwrap();
    assert!((bpm - 80.0).abs() < 1.0);
    let bpm = estimate_bpm(&pulse_train(2000.0, 12.0)).unwrap();
    assert!((bpm - 60.0).abs() < 1.0);
}

#[test]
fn detector_reports_after_window() {
    let mut det = BpmDetector::new();
    assert_eq!(det.feed(0.0, 1.0), None);
    det.start(0.0);
    let mut verdict = None;
    for (t, e) in pulse_train(500.0, 8.0) {
        if let Some(v) = det.feed(t, e) {
            verdict = Some(v);
            break;
        }
    }
    match verdict {
        Some(Detection::Tempo(bpm)) => assert!((bpm - 120.0).abs() < 1.0),
        other => panic!("unexpected verdict {:?}", other),
    }
    assert!(!det.is_running());
}

#[test]
fn flat_energy_is_inconclusive() {
    let mut det = BpmDetector::new();
    det.start(0.0);
    let mut verdict = None;
    for k in 0..=600 {
        let t = k as f64 * 1000.0 / 60.0;
        if let Some(v) = det.feed(t, 0.4) {
            verdict = Some(v);
            break;
        }
    }
    assert_eq!(verdict, Some(Detection::Inconclusive));
}
