//! Byte magnitude spectrum from raw samples, shaped like a WebAudio
//! `AnalyserNode` so the core's band reduction sees the same scale on every
//! host: windowed FFT, temporal smoothing, then a dB window mapped to 0..=255.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use vj_core::{ANALYSER_MAX_DB, ANALYSER_MIN_DB, ANALYSER_SMOOTHING, FFT_SIZE, SPECTRUM_BINS};

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buf: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);
        let window = (0..FFT_SIZE)
            .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / FFT_SIZE as f32).cos())
            .collect();
        Self {
            fft,
            window,
            buf: vec![Complex::default(); FFT_SIZE],
            smoothed: vec![0.0; SPECTRUM_BINS],
            bytes: vec![0; SPECTRUM_BINS],
        }
    }

    /// Analyse the most recent `FFT_SIZE` samples (older ones are ignored,
    /// a short history is zero-padded at the front) and return the
    /// `SPECTRUM_BINS` byte magnitudes.
    pub fn process(&mut self, samples: &[f32]) -> &[u8] {
        let take = samples.len().min(FFT_SIZE);
        let pad = FFT_SIZE - take;
        let recent = &samples[samples.len() - take..];
        for (i, slot) in self.buf.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buf);

        let range = ANALYSER_MAX_DB - ANALYSER_MIN_DB;
        for k in 0..SPECTRUM_BINS {
            let mag = self.buf[k].norm() / FFT_SIZE as f32;
            let s = ANALYSER_SMOOTHING * self.smoothed[k] + (1.0 - ANALYSER_SMOOTHING) * mag;
            self.smoothed[k] = if s.is_finite() { s } else { 0.0 };
            let db = 20.0 * self.smoothed[k].max(1e-12).log10();
            let scaled = 255.0 * (db - ANALYSER_MIN_DB) / range;
            self.bytes[k] = scaled.clamp(0.0, 255.0) as u8;
        }
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vj_core::band_energies_from_bytes;

    fn sine_at_bin(bin: usize, amp: f32) -> Vec<f32> {
        (0..FFT_SIZE)
            // Reduce the phase in integers; large f32 arguments smear the tone.
            .map(|n| amp * (2.0 * PI * ((bin * n) % FFT_SIZE) as f32 / FFT_SIZE as f32).sin())
            .collect()
    }

    #[test]
    fn silence_maps_to_zero() {
        let mut a = SpectrumAnalyzer::new();
        assert!(a.process(&[0.0; FFT_SIZE]).iter().all(|&b| b == 0));
        assert!(a.process(&[]).iter().all(|&b| b == 0));
    }

    #[test]
    fn bass_tone_lands_in_bass_band() {
        let mut a = SpectrumAnalyzer::new();
        let bytes = a.process(&sine_at_bin(10, 1.0)).to_vec();
        assert_eq!(bytes.len(), SPECTRUM_BINS);
        assert_eq!(bytes[10], 255);
        assert_eq!(bytes[300], 0);
        let bands = band_energies_from_bytes(&bytes);
        assert!(bands.bass > 0.05);
        assert!(bands.mid < 0.01);
        assert!(bands.high < 0.01);
    }

    #[test]
    fn smoothing_decays_after_the_tone_stops() {
        let mut a = SpectrumAnalyzer::new();
        let tone = sine_at_bin(100, 0.05);
        for _ in 0..20 {
            a.process(&tone);
        }
        let loud = a.process(&tone)[100];
        let after = a.process(&[0.0; FFT_SIZE])[100];
        assert!(after < loud);
        assert!(after > 0);
    }
}
