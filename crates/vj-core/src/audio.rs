//! Audio analysis bridge: reduce a magnitude spectrum to three band energies.

use crate::constants::{BASS_BINS, BYTE_MAGNITUDE_MAX, HIGH_BINS, MID_BINS};
use std::ops::Range;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandEnergies {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

impl BandEnergies {
    pub const SILENCE: BandEnergies = BandEnergies {
        bass: 0.0,
        mid: 0.0,
        high: 0.0,
    };
}

/// A per-frame spectrum source. Hosts without input report silence.
pub trait AudioBridge {
    fn sample(&mut self) -> BandEnergies;
}

/// Bridge used before any audio source is connected.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silence;

impl AudioBridge for Silence {
    fn sample(&mut self) -> BandEnergies {
        BandEnergies::SILENCE
    }
}

/// Fixed energies, handy for tests and offline previews.
impl AudioBridge for BandEnergies {
    fn sample(&mut self) -> BandEnergies {
        *self
    }
}

fn band_average<T: Copy + Into<f32>>(spectrum: &[T], range: Range<usize>, max: f32) -> f32 {
    let end = range.end.min(spectrum.len());
    if range.start >= end || max <= 0.0 {
        return 0.0;
    }
    let bins = &spectrum[range.start..end];
    let sum: f32 = bins.iter().map(|&v| v.into()).sum();
    (sum / bins.len() as f32 / max).clamp(0.0, 1.0)
}

/// Band energies from an analyser byte spectrum (0..=255 per bin).
pub fn band_energies_from_bytes(spectrum: &[u8]) -> BandEnergies {
    band_energies_with_max(spectrum, BYTE_MAGNITUDE_MAX)
}

/// Band energies from any spectrum whose full-scale magnitude is `max`.
///
/// Bins missing from a short spectrum are treated as absent, not as zero.
pub fn band_energies_with_max<T: Copy + Into<f32>>(spectrum: &[T], max: f32) -> BandEnergies {
    BandEnergies {
        bass: band_average(spectrum, BASS_BINS, max),
        mid: band_average(spectrum, MID_BINS, max),
        high: band_average(spectrum, HIGH_BINS, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spectrum_is_silence() {
        assert_eq!(band_energies_from_bytes(&[]), BandEnergies::SILENCE);
        assert_eq!(Silence.sample(), BandEnergies::SILENCE);
    }

    #[test]
    fn bands_average_their_bins() {
        let mut spec = [0u8; 512];
        spec[..40].fill(255);
        spec[40..200].fill(51);
        let b = band_energies_from_bytes(&spec);
        assert!((b.bass - 1.0).abs() < 1e-6);
        assert!((b.mid - 0.2).abs() < 1e-6);
        assert_eq!(b.high, 0.0);
    }

    #[test]
    fn short_spectrum_uses_available_bins() {
        let spec = [127.5f32; 100];
        let b = band_energies_with_max(&spec, 255.0);
        assert!((b.bass - 0.5).abs() < 1e-6);
        assert!((b.mid - 0.5).abs() < 1e-6);
        assert_eq!(b.high, 0.0);
    }
}
