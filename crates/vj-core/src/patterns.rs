//! Closed catalog of procedural visual modes and cosine palettes.
//!
//! The GPU path lives in `shaders/layers.wgsl`; [`shade`] is a CPU
//! evaluation of the same per-pixel math, used by tests and by hosts that
//! want to preview a layer without a device. Both sides must stay in sync.

use crate::compositor::LayerUniforms;
use crate::constants::{COLOR_THEME_COUNT, VISUAL_MODE_COUNT};
use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Deserializer, Serialize};
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum VisualMode {
    #[default]
    RadialWaves,
    KaleidoGrid,
    SwirlOrbit,
    TunnelLines,
    PixelMosaic,
    OrbitalObjects,
    AudioBars,
    Starfield,
    SoftClouds,
    HorizonLines,
    LaserWeb,
    RingsBloom,
    OrbPulse,
    CornerFlares,
    HaloRing,
    DnaHelix,
    PlasmaGrid,
    ExpandingWaves,
    FractalZoom,
    ElectricArcs,
}

impl VisualMode {
    pub const ALL: [VisualMode; VISUAL_MODE_COUNT as usize] = [
        VisualMode::RadialWaves,
        VisualMode::KaleidoGrid,
        VisualMode::SwirlOrbit,
        VisualMode::TunnelLines,
        VisualMode::PixelMosaic,
        VisualMode::OrbitalObjects,
        VisualMode::AudioBars,
        VisualMode::Starfield,
        VisualMode::SoftClouds,
        VisualMode::HorizonLines,
        VisualMode::LaserWeb,
        VisualMode::RingsBloom,
        VisualMode::OrbPulse,
        VisualMode::CornerFlares,
        VisualMode::HaloRing,
        VisualMode::DnaHelix,
        VisualMode::PlasmaGrid,
        VisualMode::ExpandingWaves,
        VisualMode::FractalZoom,
        VisualMode::ElectricArcs,
    ];

    /// Exact lookup; unknown ids are rejected.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Lenient lookup for imported data: ids past the catalog clamp to the last mode.
    pub fn from_id_clamped(id: u32) -> Self {
        Self::ALL[(id as usize).min(Self::ALL.len() - 1)]
    }

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            VisualMode::RadialWaves => "Radial Waves",
            VisualMode::KaleidoGrid => "Kaleido Grid",
            VisualMode::SwirlOrbit => "Swirl Orbit",
            VisualMode::TunnelLines => "Tunnel Lines",
            VisualMode::PixelMosaic => "Pixel Mosaic",
            VisualMode::OrbitalObjects => "Orbital Objects",
            VisualMode::AudioBars => "Audio Bars",
            VisualMode::Starfield => "Starfield",
            VisualMode::SoftClouds => "Soft Clouds",
            VisualMode::HorizonLines => "Horizon Lines",
            VisualMode::LaserWeb => "Laser Web",
            VisualMode::RingsBloom => "Rings + Bloom",
            VisualMode::OrbPulse => "Orb Pulse",
            VisualMode::CornerFlares => "Corner Flares",
            VisualMode::HaloRing => "Halo Ring",
            VisualMode::DnaHelix => "DNA Helix",
            VisualMode::PlasmaGrid => "Plasma Grid",
            VisualMode::ExpandingWaves => "Expanding Waves",
            VisualMode::FractalZoom => "Fractal Zoom",
            VisualMode::ElectricArcs => "Electric Arcs",
        }
    }
}

impl From<u32> for VisualMode {
    fn from(id: u32) -> Self {
        Self::from_id_clamped(id)
    }
}

/// Any number is accepted and clamped into the catalog; non-numbers load the default.
impl<'de> Deserialize<'de> for VisualMode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(crate::lenient::catalog_index(d)?
            .map(Self::from_id_clamped)
            .unwrap_or_default())
    }
}

impl From<VisualMode> for u32 {
    fn from(mode: VisualMode) -> Self {
        mode.id()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum ColorTheme {
    #[default]
    Cool,
    Warm,
    Neon,
    CyberGrid,
    Sunset,
    ToxicGreen,
    IceLaser,
    Vaporwave,
}

impl ColorTheme {
    pub const ALL: [ColorTheme; COLOR_THEME_COUNT as usize] = [
        ColorTheme::Cool,
        ColorTheme::Warm,
        ColorTheme::Neon,
        ColorTheme::CyberGrid,
        ColorTheme::Sunset,
        ColorTheme::ToxicGreen,
        ColorTheme::IceLaser,
        ColorTheme::Vaporwave,
    ];

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn from_id_clamped(id: u32) -> Self {
        Self::ALL[(id as usize).min(Self::ALL.len() - 1)]
    }

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorTheme::Cool => "Cool",
            ColorTheme::Warm => "Warm",
            ColorTheme::Neon => "Neon",
            ColorTheme::CyberGrid => "Cyber Grid",
            ColorTheme::Sunset => "Sunset",
            ColorTheme::ToxicGreen => "Toxic Green",
            ColorTheme::IceLaser => "Ice Laser",
            ColorTheme::Vaporwave => "Vaporwave",
        }
    }

    pub fn palette(self) -> Palette {
        Palette::from_rows(THEME_PALETTES[self as usize])
    }
}

impl From<u32> for ColorTheme {
    fn from(id: u32) -> Self {
        Self::from_id_clamped(id)
    }
}

impl<'de> Deserialize<'de> for ColorTheme {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(crate::lenient::catalog_index(d)?
            .map(Self::from_id_clamped)
            .unwrap_or_default())
    }
}

impl From<ColorTheme> for u32 {
    fn from(theme: ColorTheme) -> Self {
        theme.id()
    }
}

// A, B, C, D rows per theme; mirrored in layers.wgsl::theme_palette
pub const THEME_PALETTES: [[[f32; 3]; 4]; COLOR_THEME_COUNT as usize] = [
    [[0.13, 0.18, 0.25], [0.3, 0.6, 1.0], [0.35, 0.45, 0.75], [0.2, 0.4, 0.9]],
    [[0.22, 0.14, 0.10], [1.0, 0.5, 0.1], [0.5, 0.25, 0.1], [0.15, 0.05, 0.0]],
    [[0.05, 0.05, 0.10], [1.0, 0.2, 1.4], [0.7, 0.4, 0.9], [0.2, 0.4, 1.0]],
    [[0.05, 0.20, 0.08], [0.1, 1.0, 0.5], [0.3, 0.8, 0.5], [0.0, 0.4, 0.1]],
    [[0.4, 0.1, 0.2], [1.0, 0.6, 0.3], [0.9, 0.3, 0.5], [0.3, 0.1, 0.5]],
    [[0.0, 0.2, 0.05], [0.7, 1.0, 0.1], [0.3, 0.9, 0.1], [0.1, 0.4, 0.0]],
    [[0.05, 0.08, 0.15], [0.3, 0.8, 1.5], [0.2, 0.6, 1.0], [0.0, 0.3, 0.9]],
    [[0.15, 0.07, 0.20], [0.9, 0.4, 1.2], [0.4, 0.3, 0.9], [0.1, 0.8, 0.9]],
];

/// Cosine palette `a + b * cos(2π(c·t + d))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub d: Vec3,
}

impl Palette {
    pub fn from_rows(rows: [[f32; 3]; 4]) -> Self {
        Self {
            a: Vec3::from(rows[0]),
            b: Vec3::from(rows[1]),
            c: Vec3::from(rows[2]),
            d: Vec3::from(rows[3]),
        }
    }

    pub fn eval(&self, t: f32) -> Vec3 {
        let phase = (self.c * t + self.d) * TAU;
        self.a + self.b * Vec3::new(phase.x.cos(), phase.y.cos(), phase.z.cos())
    }
}

fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn hash21(p: Vec2) -> f32 {
    let mut p = (p * Vec2::new(123.34, 345.45)).fract();
    p += Vec2::splat(p.dot(p + Vec2::splat(34.345)));
    fract(p.x * p.y)
}

fn palette_for(u: &LayerUniforms) -> Palette {
    if u.use_custom_palette != 0 {
        Palette {
            a: Vec4::from(u.custom_palette[0]).truncate(),
            b: Vec4::from(u.custom_palette[1]).truncate(),
            c: Vec4::from(u.custom_palette[2]).truncate(),
            d: Vec4::from(u.custom_palette[3]).truncate(),
        }
    } else {
        ColorTheme::from_id_clamped(u.theme).palette()
    }
}

/// Evaluate one layer at a normalized screen position (`uv` in \[0,1\], y up).
///
/// Returns straight (non-premultiplied) RGBA as written by the fragment stage.
pub fn shade(u: &LayerUniforms, uv: Vec2) -> Vec4 {
    let res = Vec2::from(u.resolution);
    let aspect = res.x / res.y.max(1.0);
    let mut p = (uv - Vec2::splat(0.5)) * Vec2::new(aspect, 1.0);
    p *= u.zoom;
    let (sa, ca) = u.rotate.sin_cos();
    p = Vec2::new(ca * p.x + sa * p.y, -sa * p.x + ca * p.y);
    p += Vec2::from(u.offset);

    let r = p.length();
    let ang = p.y.atan2(p.x);
    let t = u.time;
    let (bass, mid, high) = (u.bass, u.mid, u.high);
    let pal = palette_for(u);

    let bg = pal.eval(uv.y + uv.x * 0.3 + t * 0.03) * 0.25;

    let mut fx = match VisualMode::from_id_clamped(u.mode) {
        VisualMode::RadialWaves => {
            let w = (10.0 * r - t * (2.0 + bass * 6.0)).sin();
            let v = 0.5 + 0.5 * w;
            let pattern = v + 0.25 * (ang * 6.0 + t * (1.0 + mid * 3.0)).sin();
            pal.eval(pattern + bass * 0.5)
        }
        VisualMode::KaleidoGrid => {
            let g = (p.abs() * 4.0).fract();
            let lines = smoothstep(0.48, 0.5, (g.x - 0.5).abs().max((g.y - 0.5).abs()));
            let pulse = 0.5 + 0.5 * (t * (2.0 + bass * 8.0) + r * 10.0).sin();
            pal.eval(t * 0.25 + mid) + Vec3::splat(lines * pulse * 1.5)
        }
        VisualMode::SwirlOrbit => {
            let swirl = (ang * 4.0 + r * 8.0 - t * (1.0 + bass * 4.0)).sin();
            let ring = (-r * 4.0).exp() * (0.5 + 0.5 * swirl);
            let spark = 0.5 + 0.5 * ((p.x + p.y) * 30.0 + t * (4.0 + high * 10.0)).sin();
            pal.eval(bass * 0.8 + t * 0.1) * (0.4 + ring * 1.2) * (0.8 + 0.4 * spark)
        }
        VisualMode::TunnelLines => {
            let depth = 1.0 / (0.3 + r);
            let stripes = 0.5 + 0.5 * ((p.y + t * (2.0 + bass * 6.0)) * 10.0).sin();
            let rings = 0.5 + 0.5 * ((r - t * (1.0 + mid * 4.0)) * 8.0).sin();
            let m = stripes + (rings - stripes) * (0.5 + 0.5 * high);
            pal.eval(depth + m + bass * 0.6) * depth * 1.8
        }
        VisualMode::PixelMosaic => {
            let scale = 30.0 + high * 40.0;
            let pix = (uv * Vec2::new(aspect, 1.0) * scale).floor() / scale;
            let cell = ((pix.x + pix.y) * 20.0 + t * (3.0 + mid * 5.0)).sin();
            let pulse = 0.5 + 0.5 * (t * (2.0 + bass * 8.0)).sin();
            pal.eval(cell + pulse * 0.3 + bass * 0.5)
        }
        VisualMode::OrbitalObjects => {
            let mut accum = 0.0;
            for i in 0..5 {
                let fi = i as f32;
                let angle = t * (0.3 + mid * 2.0) + fi * TAU / 5.0;
                let radius = 0.6 + 0.3 * (t + fi * 1.7).sin();
                let center = Vec2::new(angle.cos(), angle.sin()) * radius;
                accum += smoothstep(0.25, 0.0, (p - center).length());
            }
            pal.eval(t * 0.2 + high * 0.8) * accum * (0.6 + bass * 1.6)
        }
        VisualMode::AudioBars => {
            let bands = 32.0;
            let x_norm = (uv.x * bands).floor() / (bands - 1.0);
            let amp = (bass + (mid - bass) * x_norm) * 0.9 + 0.05;
            let bar = step(uv.y, amp);
            let border = smoothstep(amp, amp - 0.03, uv.y);
            let glow = bar * (0.35 + 0.65 * border);
            pal.eval(x_norm + t * 0.2 + high * 0.3) * glow * 1.8
        }
        VisualMode::Starfield => {
            let grid = uv * Vec2::new(aspect, 1.0) * 40.0;
            let cell = grid.floor();
            let f = grid.fract() - Vec2::splat(0.5);
            let n = hash21(cell);
            let star = smoothstep(0.25, 0.0, (f * (1.2 + n * 1.5)).length());
            let twinkle = 0.5 + 0.5 * (t * (2.0 + n * 6.0) + n * 10.0).sin();
            let energy = star * twinkle * (0.3 + high * 1.7);
            pal.eval(n + high + t * 0.05) * energy * step(0.82, n)
        }
        VisualMode::SoftClouds => {
            let q = p * 1.2;
            let n1 = (q.x * 3.0 + t * 0.4).sin() * (q.y * 2.7 - t * 0.3).sin();
            let n2 = (q.x * 5.3 - t * 0.2).sin() * (q.y * 4.1 + t * 0.35).cos();
            let n = (n1 + n2) * 0.25;
            pal.eval(n + bass * 0.3 + mid * 0.2) * 0.7
        }
        VisualMode::HorizonLines => {
            let horizon = uv.y;
            let base = smoothstep(0.0, 0.3, horizon);
            let strip = 0.5 + 0.5 * (horizon * 40.0 - t * (3.0 + mid * 6.0)).sin();
            pal.eval(horizon + t * 0.1 + bass * 0.4) * (base + strip * 0.6)
        }
        VisualMode::LaserWeb => {
            let q = p * 1.4;
            let l1 = (q.x * 12.0 + t * (4.0 + high * 8.0)).sin().abs();
            let l2 = ((q.y + q.x) * 10.0 - t * (3.0 + mid * 6.0)).sin().abs();
            let l3 = ((q.y - q.x) * 14.0 + t * (2.0 + bass * 4.0)).sin().abs();
            let web = (1.0 - l1.min(l2).min(l3)).powi(2);
            pal.eval(t * 0.3 + high * 0.8) * web * (0.6 + high * 1.4)
        }
        VisualMode::RingsBloom => {
            let ring = 0.5 + 0.5 * (r * 16.0 - t * (3.0 + bass * 5.0)).sin();
            let bloom = ring * (-r * 3.0).exp();
            pal.eval(r + t * 0.15 + mid * 0.4) * (0.4 + bloom * 2.0)
        }
        VisualMode::OrbPulse => {
            let orb = smoothstep(0.45, 0.0, r);
            let wave = 0.5 + 0.5 * (t * (2.0 + bass * 5.0) + r * 8.0).sin();
            pal.eval(t * 0.4 + mid * 0.6) * orb * wave * (0.8 + high * 0.6)
        }
        VisualMode::CornerFlares => {
            let q = p * 1.4;
            let mut mask = 0.0;
            for c in [
                Vec2::new(0.9, 0.6),
                Vec2::new(-0.9, 0.6),
                Vec2::new(0.9, -0.6),
                Vec2::new(-0.9, -0.6),
            ] {
                mask += smoothstep(0.6, 0.0, (q - c).length());
            }
            let mask = mask.clamp(0.0, 1.0);
            let tw = 0.5 + 0.5 * (t * (3.0 + high * 8.0)).sin();
            pal.eval(t * 0.3 + bass * 0.5 + high * 0.5) * mask * tw * (0.9 + high * 0.8)
        }
        VisualMode::HaloRing => {
            let (inner, outer) = (0.35, 0.52);
            let band = smoothstep(inner, inner + 0.05, r) * (1.0 - smoothstep(outer - 0.05, outer, r));
            let wob = 0.5 + 0.5 * (t * (2.5 + bass * 6.0) + ang * 6.0).sin();
            pal.eval(t * 0.25 + mid * 0.4 + bass * 0.3) * band * wob * (0.8 + high * 0.7)
        }
        VisualMode::DnaHelix => {
            let helix_r = 0.3;
            let s1 = (ang * 3.0 + t * 2.0 + bass * 5.0).sin() * 0.15;
            let s2 = (ang * 3.0 + t * 2.0 + std::f32::consts::PI + mid * 4.0).sin() * 0.15;
            let d1 = (r - (helix_r + s1)).abs();
            let d2 = (r - (helix_r + s2)).abs();
            let mask = smoothstep(0.05, 0.0, d1) + smoothstep(0.05, 0.0, d2);
            let pulse = 0.5 + 0.5 * (t * 3.0 + high * 8.0).sin();
            pal.eval(t * 0.2 + ang * 0.5) * mask * pulse * (0.7 + mid * 0.8)
        }
        VisualMode::PlasmaGrid => {
            let g = p * 8.0;
            let plasma = (g.x + t + bass * 3.0).sin()
                * (g.y + t * 1.3 + mid * 2.5).sin()
                * ((g.x + g.y) * 0.5 + t * 0.7).sin();
            let plasma = (plasma + 1.0) * 0.5;
            let grid_mask = fract(plasma * 4.0 + high * 2.0);
            pal.eval(plasma + t * 0.3) * grid_mask * (0.6 + bass * 0.9)
        }
        VisualMode::ExpandingWaves => {
            let speed = t * 2.0 + bass * 4.0;
            let waves = ((r * 15.0 - speed).sin() * 0.5 + 0.5).powf(2.0 + mid * 3.0);
            let spin = (ang * 8.0 + t * 1.5).sin() * 0.5 + 0.5;
            pal.eval(t * 0.25 + r + high * 0.6) * waves * spin * (0.7 + high * 0.8)
        }
        VisualMode::FractalZoom => {
            let mut z = p * (2.0 + bass * 1.5);
            let mut iter = 0.0;
            for _ in 0..12 {
                z = Vec2::new(z.x * z.x - z.y * z.y, 2.0 * z.x * z.y) + p * 0.5;
                if z.length() > 2.0 {
                    break;
                }
                iter += 1.0;
            }
            let fractal = iter / 12.0;
            let twist = (t * 1.5 + fractal * TAU + mid * 4.0).sin();
            pal.eval(fractal + t * 0.2 + high * 0.5) * (fractal * 0.8 + 0.2) * (0.6 + twist * 0.4)
        }
        VisualMode::ElectricArcs => {
            let arc_angle = ang + t * 2.0 + bass * 5.0;
            let noise = ((arc_angle * 6.0).sin() * (r * 20.0 + t * 3.0).sin())
                .abs()
                .powf(0.3 + mid * 0.5);
            let fade = (-r * 2.0).exp();
            let flicker = 0.5 + 0.5 * (t * 8.0 + high * 12.0).sin();
            pal.eval(t * 0.4 + noise * 2.0) * noise * fade * flicker * (0.8 + high)
        }
    };

    fx *= smoothstep(0.9, 0.3, r);
    let beat_pulse = 0.5 + 0.5 * (TAU * u.beat_phase).sin();
    let flash = 1.0 + (0.3 + beat_pulse * 1.7 - 1.0) * u.strobe;
    fx *= flash;

    let (color, alpha) = if u.kind == 0 {
        (bg + (fx - bg) * 0.9, u.opacity)
    } else {
        let intensity = ((fx.x + fx.y + fx.z) / 3.0).clamp(0.0, 1.0);
        (fx, u.opacity * intensity)
    };
    (color * u.brightness).extend(alpha)
}
