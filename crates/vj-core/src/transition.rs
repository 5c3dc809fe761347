//! One-shot transition state machine.
//!
//! ```text
//! Idle --start(gate)--> Pending --gate elapsed--> Active --progress==1--> Idle
//! Idle --start(none)--> Active
//! ```
//! A `start` in any state replaces the pending change and restarts the
//! machine; there is no cancel. The change is handed back to the caller
//! exactly once, on the tick where progress reaches 1.

use crate::constants::DEFAULT_TRANSITION_SECS;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionMode {
    #[default]
    Fade,
    Wipe,
    Zoom,
}

impl TransitionMode {
    /// Unknown names fall back to `fade`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "wipe" => TransitionMode::Wipe,
            "zoom" => TransitionMode::Zoom,
            _ => TransitionMode::Fade,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionSettings {
    pub enabled: bool,
    pub mode: TransitionMode,
    pub duration_secs: f32,
    pub on_beat: bool,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: TransitionMode::Fade,
            duration_secs: DEFAULT_TRANSITION_SECS,
            on_beat: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Phase<A> {
    Idle,
    Pending { fire_at_ms: f64, action: A },
    Active { start_ms: f64, action: A },
}

/// Result of one transition tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionTick<A> {
    /// Layer opacity multiplier for this frame.
    pub fade: f32,
    /// The deferred change, present only on the completing tick.
    pub completed: Option<A>,
}

#[derive(Clone, Debug)]
pub struct TransitionEngine<A> {
    phase: Phase<A>,
    duration_ms: f64,
}

impl<A> Default for TransitionEngine<A> {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION_SECS)
    }
}

/// Symmetric quadratic ease-in-out.
#[inline]
pub fn ease_in_out(p: f32) -> f32 {
    if p < 0.5 {
        2.0 * p * p
    } else {
        1.0 - (-2.0 * p + 2.0).powi(2) / 2.0
    }
}

impl<A> TransitionEngine<A> {
    pub fn new(duration_secs: f32) -> Self {
        let mut t = Self {
            phase: Phase::Idle,
            duration_ms: 0.0,
        };
        t.set_duration(duration_secs);
        t
    }

    pub fn set_duration(&mut self, secs: f32) {
        self.duration_ms = if secs.is_finite() {
            secs.max(0.0) as f64 * 1000.0
        } else {
            DEFAULT_TRANSITION_SECS as f64 * 1000.0
        };
    }

    pub fn duration_secs(&self) -> f32 {
        (self.duration_ms / 1000.0) as f32
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active { .. })
    }

    /// Begin a transition towards `action`. With `gate_delay_ms` the fade
    /// waits that long (the next beat edge) before starting.
    pub fn start(&mut self, action: A, now_ms: f64, gate_delay_ms: Option<f64>) {
        if !self.is_idle() {
            log::info!("[transition] restarted; previous change dropped");
        }
        self.phase = match gate_delay_ms {
            Some(delay) if delay > 0.0 => Phase::Pending {
                fire_at_ms: now_ms + delay,
                action,
            },
            _ => Phase::Active {
                start_ms: now_ms,
                action,
            },
        };
    }

    /// Linear progress in \[0, 1\]; 1.0 when nothing is running.
    pub fn progress(&self, now_ms: f64) -> f32 {
        match &self.phase {
            Phase::Active { start_ms, .. } => self.linear(*start_ms, now_ms),
            Phase::Pending { .. } => 0.0,
            Phase::Idle => 1.0,
        }
    }

    fn linear(&self, start_ms: f64, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn tick(&mut self, now_ms: f64) -> TransitionTick<A> {
        if let Phase::Pending { fire_at_ms, .. } = self.phase {
            if now_ms >= fire_at_ms {
                if let Phase::Pending { action, .. } =
                    std::mem::replace(&mut self.phase, Phase::Idle)
                {
                    self.phase = Phase::Active {
                        start_ms: fire_at_ms,
                        action,
                    };
                }
            }
        }
        match self.phase {
            Phase::Idle | Phase::Pending { .. } => TransitionTick {
                fade: 1.0,
                completed: None,
            },
            Phase::Active { start_ms, .. } => {
                let p = self.linear(start_ms, now_ms);
                if p >= 1.0 {
                    let completed = match std::mem::replace(&mut self.phase, Phase::Idle) {
                        Phase::Active { action, .. } => Some(action),
                        _ => None,
                    };
                    TransitionTick {
                        fade: 1.0,
                        completed,
                    }
                } else {
                    TransitionTick {
                        fade: ease_in_out(p),
                        completed: None,
                    }
                }
            }
        }
    }
}
