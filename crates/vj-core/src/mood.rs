//! Built-in genre looks.

use crate::controls::GlobalControls;
use crate::layer::{BlendMode, LayerKind, LayerStore};
use crate::patterns::{ColorTheme, VisualMode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodId {
    Chill,
    Edm,
    Dubstep,
    Techno,
    Lofi,
    Psy,
}

impl MoodId {
    pub const ALL: [MoodId; 6] = [
        MoodId::Chill,
        MoodId::Edm,
        MoodId::Dubstep,
        MoodId::Techno,
        MoodId::Lofi,
        MoodId::Psy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MoodId::Chill => "chill",
            MoodId::Edm => "edm",
            MoodId::Dubstep => "dubstep",
            MoodId::Techno => "techno",
            MoodId::Lofi => "lofi",
            MoodId::Psy => "psy",
        }
    }

    pub fn mood(self) -> &'static Mood {
        &MOODS[self as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mood `{0}`")]
pub struct UnknownMood(pub String);

impl FromStr for MoodId {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoodId::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

#[derive(Debug)]
pub struct Mood {
    pub id: MoodId,
    pub label: &'static str,
    pub brightness: f32,
    pub audio_react: f32,
    pub camera_zoom: f32,
    pub camera_rotate_deg: f32,
    pub modes: &'static [VisualMode],
    pub themes: &'static [ColorTheme],
    pub blends: &'static [BlendMode],
}

use BlendMode as B;
use ColorTheme as C;
use VisualMode as V;

pub static MOODS: [Mood; 6] = [
    Mood {
        id: MoodId::Chill,
        label: "Chill / Ambient",
        brightness: 0.45,
        audio_react: 0.6,
        camera_zoom: 1.15,
        camera_rotate_deg: 0.0,
        modes: &[V::SoftClouds, V::DnaHelix, V::PixelMosaic],
        themes: &[C::Vaporwave, C::Sunset, C::Cool],
        blends: &[B::Normal, B::Screen, B::Overlay],
    },
    Mood {
        id: MoodId::Edm,
        label: "Peak EDM / Festival",
        brightness: 0.95,
        audio_react: 1.8,
        camera_zoom: 0.8,
        camera_rotate_deg: 12.0,
        modes: &[V::AudioBars, V::LaserWeb, V::ElectricArcs, V::ExpandingWaves],
        themes: &[C::Neon, C::CyberGrid, C::IceLaser, C::Warm],
        blends: &[B::Add, B::Add, B::Dodge, B::Screen],
    },
    Mood {
        id: MoodId::Dubstep,
        label: "Dubstep / Heavy Bass",
        brightness: 0.85,
        audio_react: 2.0,
        camera_zoom: 0.85,
        camera_rotate_deg: -15.0,
        modes: &[V::SwirlOrbit, V::FractalZoom, V::ElectricArcs, V::PlasmaGrid],
        themes: &[C::ToxicGreen, C::Neon, C::IceLaser, C::CyberGrid],
        blends: &[B::Add, B::Difference, B::Dodge, B::Add],
    },
    Mood {
        id: MoodId::Techno,
        label: "Techno / Minimal",
        brightness: 0.6,
        audio_react: 1.1,
        camera_zoom: 1.0,
        camera_rotate_deg: 0.0,
        modes: &[V::TunnelLines, V::HorizonLines, V::KaleidoGrid, V::PlasmaGrid],
        themes: &[C::CyberGrid, C::IceLaser, C::Cool, C::CyberGrid],
        blends: &[B::Normal, B::Multiply, B::Screen, B::Overlay],
    },
    Mood {
        id: MoodId::Lofi,
        label: "Lofi / Soft Pastel",
        brightness: 0.4,
        audio_react: 0.5,
        camera_zoom: 1.25,
        camera_rotate_deg: 0.0,
        modes: &[V::SoftClouds, V::PixelMosaic, V::RingsBloom],
        themes: &[C::Vaporwave, C::Sunset, C::Cool],
        blends: &[B::Normal, B::Screen, B::Overlay],
    },
    Mood {
        id: MoodId::Psy,
        label: "Psytrance / Hypno",
        brightness: 0.9,
        audio_react: 1.6,
        camera_zoom: 0.9,
        camera_rotate_deg: 25.0,
        modes: &[
            V::KaleidoGrid,
            V::SwirlOrbit,
            V::FractalZoom,
            V::DnaHelix,
            V::LaserWeb,
        ],
        themes: &[C::Neon, C::Vaporwave, C::CyberGrid, C::IceLaser, C::ToxicGreen],
        blends: &[B::Add, B::Screen, B::Difference, B::Dodge, B::Add],
    },
];

impl Mood {
    /// Set the global look and restyle each existing layer from the cyclic
    /// lists. Layer count is unchanged.
    pub fn apply(&self, controls: &mut GlobalControls, store: &mut LayerStore) {
        controls.brightness = self.brightness;
        controls.audio_react = self.audio_react;
        controls.camera_zoom = self.camera_zoom;
        controls.camera_rotate_deg = self.camera_rotate_deg;
        for (i, layer) in store.layers_mut().enumerate() {
            layer.visual_mode = self.modes[i % self.modes.len()];
            layer.color_theme = self.themes[i % self.themes.len()];
            layer.blend = self.blends[i % self.blends.len()];
            layer.kind = LayerKind::Background;
        }
        log::info!("[preset] mood {}", self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_id() {
        for id in MoodId::ALL {
            assert_eq!(id.mood().id, id);
            assert_eq!(id.as_str().parse::<MoodId>(), Ok(id));
        }
        assert_eq!("polka".parse::<MoodId>(), Err(UnknownMood("polka".to_string())));
    }

    #[test]
    fn lists_cycle_over_layers() {
        let mut controls = GlobalControls::default();
        let mut store = LayerStore::new();
        for _ in 0..3 {
            store.add_layer().unwrap();
        }
        MoodId::Lofi.mood().apply(&mut controls, &mut store);
        assert_eq!(store.len(), 4);
        assert_eq!(store.layers()[3].visual_mode, VisualMode::SoftClouds);
        assert_eq!(store.layers()[2].blend, BlendMode::Overlay);
        assert_eq!(controls.camera_zoom, 1.25);
    }
}
