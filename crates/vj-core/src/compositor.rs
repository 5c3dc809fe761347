//! Frame planning: turns engine state into an ordered list of layer draws.
//!
//! Nothing here touches a GPU. The plan is consumed as-is by the wgpu
//! renderer (`gpu` feature) or by the CPU evaluator in tests.

use crate::constants::*;
use crate::controls::GlobalControls;
use crate::layer::{BlendMode, LayerKind, LayerStore};
use crate::reactivity::ReactivityFrame;
use bytemuck::{Pod, Zeroable};
use smallvec::SmallVec;

/// Per-draw uniform block. Layout mirrors `LayerUniforms` in
/// `shaders/layers.wgsl` (144 bytes, 16-byte aligned tail).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LayerUniforms {
    pub resolution: [f32; 2],
    pub offset: [f32; 2],
    pub time: f32,
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub brightness: f32,
    pub opacity: f32,
    pub zoom: f32,
    pub rotate: f32,
    pub strobe: f32,
    pub beat_phase: f32,
    pub mode: u32,
    pub theme: u32,
    /// 0 background, 1 object
    pub kind: u32,
    pub use_custom_palette: u32,
    pub _pad: [u32; 2],
    pub custom_palette: [[f32; 4]; 4],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    Src,
    OneMinusSrc,
    SrcAlpha,
    OneMinusSrcAlpha,
    Dst,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendOp {
    Add,
    ReverseSubtract,
}

/// Fixed-function blend applied to both color and alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendDesc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub op: BlendOp,
}

impl BlendMode {
    pub fn desc(self) -> BlendDesc {
        use BlendFactor::*;
        let (src, dst, op) = match self {
            BlendMode::Normal | BlendMode::Overlay => (SrcAlpha, OneMinusSrcAlpha, BlendOp::Add),
            BlendMode::Add => (SrcAlpha, One, BlendOp::Add),
            BlendMode::Screen => (One, OneMinusSrc, BlendOp::Add),
            BlendMode::Multiply => (Dst, OneMinusSrcAlpha, BlendOp::Add),
            BlendMode::Subtract => (SrcAlpha, One, BlendOp::ReverseSubtract),
            BlendMode::Dodge => (One, One, BlendOp::Add),
            BlendMode::Burn => (Zero, OneMinusSrc, BlendOp::Add),
            BlendMode::Difference => (One, One, BlendOp::ReverseSubtract),
        };
        BlendDesc { src, dst, op }
    }
}

/// Overlay values for the logo/HUD collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    pub glow: f32,
    pub scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerDraw {
    /// Index in the layer store.
    pub layer: usize,
    pub blend: BlendMode,
    pub uniforms: LayerUniforms,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub zoom: f32,
    pub rotation: f32,
    pub brightness: f32,
    pub hud: Hud,
    pub beat_edge: bool,
    pub bpm: f32,
    pub transition_fade: f32,
    /// Back-to-front.
    pub draws: SmallVec<[LayerDraw; MAX_LAYERS]>,
}

/// Per-frame values computed before planning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInputs {
    pub time_secs: f32,
    pub resolution: [f32; 2],
    pub react: ReactivityFrame,
    pub beat_edge: bool,
    pub beat_phase: f32,
    pub bpm: f32,
    pub transition_fade: f32,
}

pub fn effective_brightness(controls: &GlobalControls, beat_edge: bool) -> f32 {
    let mut base = controls.brightness;
    if controls.beat_strobe && beat_edge {
        base = (base + BEAT_STROBE_BOOST).min(1.0);
    }
    base * (BRIGHTNESS_ENERGY_BASE + controls.macros.energy * BRIGHTNESS_ENERGY_GAIN)
}

/// Camera zoom and rotation (radians) after audio wobble.
pub fn camera(controls: &GlobalControls, react: &ReactivityFrame) -> (f32, f32) {
    let motion_amt = controls.macros.motion * MOTION_SCALE;
    let zoom = controls.camera_zoom * (1.0 - (react.bass - 0.5) * motion_amt);
    let rotation = controls.camera_rotate_deg.to_radians()
        + motion_amt * (react.mid - react.high) * ROTATE_WOBBLE_GAIN;
    (zoom, rotation)
}

pub fn plan_frame(inputs: &FrameInputs, controls: &GlobalControls, store: &LayerStore) -> FramePlan {
    let react = inputs.react;
    let (zoom, rotation) = camera(controls, &react);
    let brightness = effective_brightness(controls, inputs.beat_edge);
    let motion = controls.macros.motion;
    let strobe_gain = STROBE_ENERGY_BASE + controls.macros.energy * STROBE_ENERGY_GAIN;
    let palette = &controls.custom_palette;
    let custom_palette = palette.rows.map(|[r, g, b]| [r, g, b, 0.0]);

    let draws = store
        .visible()
        .map(|(i, layer)| {
            let mut offset = [layer.offset_x, layer.offset_y];
            if layer.audio_position_react {
                let scale = POSITION_REACT_GAIN * (0.5 + motion);
                offset[0] += (react.bass - 0.5) * scale;
                offset[1] += (react.high - 0.5) * scale;
            }
            LayerDraw {
                layer: i,
                blend: layer.blend,
                uniforms: LayerUniforms {
                    resolution: inputs.resolution,
                    offset,
                    time: inputs.time_secs,
                    bass: react.bass,
                    mid: react.mid,
                    high: react.high,
                    brightness,
                    opacity: layer.opacity * inputs.transition_fade,
                    zoom,
                    rotate: rotation,
                    strobe: layer.strobe_intensity * strobe_gain,
                    beat_phase: inputs.beat_phase,
                    mode: layer.visual_mode.id(),
                    theme: layer.color_theme.id(),
                    kind: (layer.kind == LayerKind::Object) as u32,
                    use_custom_palette: palette.active as u32,
                    _pad: [0; 2],
                    custom_palette,
                },
            }
        })
        .collect();

    FramePlan {
        zoom,
        rotation,
        brightness,
        hud: Hud {
            glow: HUD_GLOW_BASE + react.bass * HUD_GLOW_GAIN,
            scale: 1.0 + react.bass * HUD_SCALE_GAIN,
        },
        beat_edge: inputs.beat_edge,
        bpm: inputs.bpm,
        transition_fade: inputs.transition_fade,
        draws,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_shader_size() {
        assert_eq!(std::mem::size_of::<LayerUniforms>(), 144);
        assert!(std::mem::size_of::<LayerUniforms>() as u64 <= UNIFORM_SLOT_SIZE);
    }

    #[test]
    fn subtractive_modes_reverse_the_equation() {
        for b in BlendMode::ALL {
            let reversed = b.desc().op == BlendOp::ReverseSubtract;
            assert_eq!(
                reversed,
                matches!(b, BlendMode::Subtract | BlendMode::Difference)
            );
        }
    }

    #[test]
    fn strobe_boost_is_capped_before_energy_scale() {
        let controls = GlobalControls {
            brightness: 0.9,
            beat_strobe: true,
            ..GlobalControls::default()
        };
        let b = effective_brightness(&controls, true);
        assert!((b - 1.0 * (0.7 + 0.5 * 0.8)).abs() < 1e-6);
        let b = effective_brightness(&controls, false);
        assert!((b - 0.9 * 1.1).abs() < 1e-6);
    }
}
