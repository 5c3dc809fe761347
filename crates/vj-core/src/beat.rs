//! Beat clock, tap tempo and onset-based tempo detection.
//!
//! All timestamps are milliseconds on a monotonic host clock.

use crate::constants::*;
use smallvec::SmallVec;

#[inline]
pub fn bpm_in_range(bpm: f32) -> bool {
    bpm.is_finite() && bpm > MIN_BPM && bpm < MAX_BPM
}

/// Continuous beat phase with a discrete edge detector.
///
/// The phase is always derived from `phase_origin_ms` and `bpm`; only the
/// index of the last reported edge is stored.
#[derive(Clone, Debug)]
pub struct BeatClock {
    bpm: f32,
    phase_origin_ms: f64,
    last_beat_index: i64,
}

impl BeatClock {
    pub fn new(now_ms: f64) -> Self {
        Self {
            bpm: DEFAULT_BPM,
            phase_origin_ms: now_ms,
            last_beat_index: 0,
        }
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn interval_ms(&self) -> f64 {
        60_000.0 / self.bpm as f64
    }

    /// Beats elapsed since the origin, as a real number.
    pub fn phase(&self, now_ms: f64) -> f64 {
        (now_ms - self.phase_origin_ms) / self.interval_ms()
    }

    pub fn last_beat_index(&self) -> i64 {
        self.last_beat_index
    }

    /// Advance to `now_ms`; true when a new beat started since the last tick.
    ///
    /// At most one edge is reported per call no matter how many beats the
    /// gap spans.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let current = self.phase(now_ms).floor() as i64;
        if current > self.last_beat_index {
            self.last_beat_index = current;
            true
        } else {
            false
        }
    }

    /// Milliseconds until the next edge.
    pub fn time_to_next_beat(&self, now_ms: f64) -> f64 {
        let phase = self.phase(now_ms);
        ((phase.floor() + 1.0 - phase) * self.interval_ms()).max(0.0)
    }

    /// Re-pace future beats. The phase at `now_ms` is kept so the elapsed beat
    /// count stays continuous. Out-of-range values are rejected.
    pub fn set_bpm(&mut self, bpm: f32, now_ms: f64) -> bool {
        if !bpm_in_range(bpm) {
            return false;
        }
        let phase = self.phase(now_ms);
        self.bpm = bpm;
        self.phase_origin_ms = now_ms - phase * self.interval_ms();
        log::info!("[beat] bpm={:.1}", bpm);
        true
    }
}

/// Tap-tempo estimator over the last five intervals.
#[derive(Clone, Debug, Default)]
pub struct TapTempo {
    taps: SmallVec<[f64; TAP_HISTORY]>,
}

impl TapTempo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tap; returns the BPM estimate when it is usable.
    pub fn tap(&mut self, now_ms: f64) -> Option<f32> {
        if let Some(&last) = self.taps.last() {
            if now_ms - last > TAP_RESET_MS || now_ms < last {
                self.taps.clear();
            }
        }
        if self.taps.len() == TAP_HISTORY {
            self.taps.remove(0);
        }
        self.taps.push(now_ms);
        if self.taps.len() < 2 {
            return None;
        }
        let span = self.taps[self.taps.len() - 1] - self.taps[0];
        let avg = span / (self.taps.len() - 1) as f64;
        if avg <= 0.0 {
            return None;
        }
        let bpm = (60_000.0 / avg) as f32;
        bpm_in_range(bpm).then_some(bpm)
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }
}

/// Outcome of a finished detection window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Detection {
    Tempo(f32),
    Inconclusive,
}

/// Onset-interval tempo estimator fed with per-frame bass energy.
#[derive(Clone, Debug, Default)]
pub struct BpmDetector {
    started_ms: Option<f64>,
    frames: Vec<(f64, f32)>,
}

impl BpmDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now_ms: f64) {
        self.started_ms = Some(now_ms);
        self.frames.clear();
        log::info!("[beat] tempo detection started");
    }

    pub fn is_running(&self) -> bool {
        self.started_ms.is_some()
    }

    /// Feed one frame; returns the verdict once the analysis window closes.
    pub fn feed(&mut self, now_ms: f64, bass: f32) -> Option<Detection> {
        let started = self.started_ms?;
        self.frames.push((now_ms, bass));
        if now_ms - started < DETECT_WINDOW_MS {
            return None;
        }
        self.started_ms = None;
        let frames = std::mem::take(&mut self.frames);
        Some(match estimate_bpm(&frames) {
            Some(bpm) => Detection::Tempo(bpm),
            None => Detection::Inconclusive,
        })
    }
}

/// Median inter-onset interval of `(timestamp, energy)` frames, folded into
/// a musical tempo range.
pub fn estimate_bpm(frames: &[(f64, f32)]) -> Option<f32> {
    let mut onsets: Vec<f64> = Vec::new();
    let mut window_start = 0usize;
    let mut window_sum = 0.0f32;
    for i in 0..frames.len() {
        let (t, e) = frames[i];
        while window_start < i && t - frames[window_start].0 > DETECT_TRAILING_MS {
            window_sum -= frames[window_start].1;
            window_start += 1;
        }
        let trailing = i - window_start;
        if trailing > 0 {
            let mean = window_sum / trailing as f32;
            let rising = e > frames[i - 1].1;
            let loud = e > mean * DETECT_ONSET_RATIO && e > DETECT_FLOOR_ENERGY;
            let spaced = onsets
                .last()
                .map_or(true, |&last| t - last >= DETECT_REFRACTORY_MS);
            if rising && loud && spaced {
                onsets.push(t);
            }
        }
        window_sum += e;
    }
    if onsets.len() < DETECT_MIN_ONSETS {
        return None;
    }
    let mut intervals: Vec<f64> = onsets.windows(2).map(|w| w[1] - w[0]).collect();
    intervals.sort_by(|a, b| a.total_cmp(b));
    let median = intervals[intervals.len() / 2];
    if median <= 0.0 {
        return None;
    }
    let mut bpm = (60_000.0 / median) as f32;
    while bpm < DETECT_FOLD_LOW {
        bpm *= 2.0;
    }
    while bpm >= DETECT_FOLD_HIGH {
        bpm /= 2.0;
    }
    bpm_in_range(bpm).then_some(bpm)
}
