pub mod audio;
pub mod beat;
pub mod compositor;
pub mod constants;
pub mod controls;
pub mod engine;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod layer;
mod lenient;
pub mod midi;
pub mod mood;
pub mod params;
pub mod patterns;
pub mod preset;
pub mod reactivity;
pub mod transition;

pub static LAYERS_WGSL: &str = include_str!("../shaders/layers.wgsl");

pub use audio::{band_energies_from_bytes, band_energies_with_max, AudioBridge, BandEnergies, Silence};
pub use beat::{BeatClock, BpmDetector, TapTempo};
pub use compositor::{FramePlan, LayerDraw, LayerUniforms};
pub use constants::*;
pub use controls::GlobalControls;
pub use engine::{Command, EngineContext, Notice, PendingChange};
pub use layer::{BlendMode, Layer, LayerKind, LayerStore};
pub use midi::{MidiMapper, MidiMessage};
pub use mood::{MoodId, UnknownMood};
pub use params::{LayerParam, ParamId};
pub use patterns::{ColorTheme, VisualMode};
pub use preset::{decode_share, encode_share, MemoryStorage, Preset, PresetLibrary, PresetStorage};
pub use reactivity::{map_reactivity, ReactivityFrame, ReactivityInput};
pub use transition::{TransitionEngine, TransitionMode, TransitionSettings};
