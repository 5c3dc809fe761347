//! Audio-to-visual reactivity mapping. Pure and stateless.

use crate::audio::BandEnergies;
use crate::constants::*;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReactivityInput {
    pub bands: BandEnergies,
    /// 0..2 slider
    pub audio_react: f32,
    pub macro_energy: f32,
    pub macro_detail: f32,
    pub beat_edge: bool,
    pub beat_sync: bool,
    pub beat_sync_intensity: f32,
}

/// Normalized per-frame band values fed to the shaders.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReactivityFrame {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

/// Soft-compressed gain; always in (0, 1) for non-negative inputs.
#[inline]
pub fn react_gain(audio_react: f32, macro_energy: f32) -> f32 {
    let base = REACT_BASE + audio_react * REACT_SLIDER_GAIN;
    let energy = ENERGY_BASE + macro_energy * ENERGY_GAIN;
    let raw = base * energy;
    raw / (1.0 + REACT_COMPRESSION * raw)
}

pub fn map_reactivity(input: &ReactivityInput) -> ReactivityFrame {
    let react = react_gain(input.audio_react, input.macro_energy);
    let mut bass = (input.bands.bass * react).clamp(0.0, 1.0);
    let mut mid = (input.bands.mid * react).clamp(0.0, 1.0);
    let mut high = (input.bands.high * react).clamp(0.0, 1.0);

    if input.beat_edge && input.beat_sync {
        let boost = input.beat_sync_intensity * BEAT_BOOST_SCALE;
        bass = (bass + boost).min(1.0);
        mid = (mid + boost * BEAT_BOOST_MID).min(1.0);
        high = (high + boost * BEAT_BOOST_HIGH).min(1.0);
    }

    high = (high * (DETAIL_BASE + input.macro_detail * DETAIL_GAIN)).clamp(0.0, 1.0);
    ReactivityFrame { bass, mid, high }
}
