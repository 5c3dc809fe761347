use vj_core::reactivity::react_gain;
use vj_core::{map_reactivity, BandEnergies, ReactivityInput};

fn input(bass: f32, mid: f32, high: f32) -> ReactivityInput {
    ReactivityInput {
        bands: BandEnergies { bass, mid, high },
        audio_react: 1.0,
        macro_energy: 0.5,
        macro_detail: 0.5,
        beat_edge: false,
        beat_sync: false,
        beat_sync_intensity: 0.5,
    }
}

#[test]
fn reference_frame_matches_hand_computation() {
    let react = react_gain(1.0, 0.5);
    assert!((react - 1.2075 / 1.845).abs() < 1e-5);
    let out = map_reactivity(&input(0.8, 0.2, 0.1));
    assert!((out.bass - 0.8 * react).abs() < 1e-5);
    assert!((out.bass - 0.5236).abs() < 1e-3);
    assert!((out.mid - 0.2 * react).abs() < 1e-5);
    assert!((out.high - 0.1 * react * 1.5).abs() < 1e-5);
}

#[test]
fn gain_stays_in_open_unit_interval_and_is_monotonic() {
    let mut prev_row = 0.0f32;
    for i in 0..=40 {
        let slider = i as f32 * 0.05;
        let mut prev = 0.0f32;
        for j in 0..=20 {
            let energy = j as f32 * 0.05;
            let g = react_gain(slider, energy);
            assert!(g > 0.0 && g < 1.0, "gain {} out of range", g);
            assert!(g >= prev);
            prev = g;
        }
        let g0 = react_gain(slider, 0.0);
        assert!(g0 >= prev_row);
        prev_row = g0;
    }
}

#[test]
fn beat_boost_needs_both_edge_and_sync() {
    let mut i = input(0.2, 0.2, 0.2);
    i.beat_edge = true;
    let no_sync = map_reactivity(&i);
    i.beat_sync = true;
    let boosted = map_reactivity(&i);
    assert!((boosted.bass - no_sync.bass - 0.25).abs() < 1e-5);
    assert!((boosted.mid - no_sync.mid - 0.125).abs() < 1e-5);
    assert!(boosted.high > no_sync.high);
}

#[test]
fn outputs_clamp_at_full_scale() {
    let mut i = input(1.0, 1.0, 1.0);
    i.audio_react = 2.0;
    i.macro_energy = 1.0;
    i.macro_detail = 1.0;
    i.beat_edge = true;
    i.beat_sync = true;
    i.beat_sync_intensity = 1.0;
    let out = map_reactivity(&i);
    assert_eq!(out.bass, 1.0);
    assert_eq!(out.mid, 1.0);
    assert_eq!(out.high, 1.0);
}

#[test]
fn silence_maps_to_zero() {
    let out = map_reactivity(&input(0.0, 0.0, 0.0));
    assert_eq!((out.bass, out.mid, out.high), (0.0, 0.0, 0.0));
}
