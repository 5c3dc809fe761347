//! Stable parameter identifiers.
//!
//! MIDI mappings and UI bindings refer to parameters by these ids (never by
//! live references) so a mapping table can be stored and rebuilt later.

use crate::constants::{
    AUDIO_REACT_RANGE, CAMERA_ROTATE_RANGE, CAMERA_ZOOM_RANGE, MAX_LAYERS, TRANSITION_SECS_RANGE,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerParam {
    Opacity,
    OffsetX,
    OffsetY,
    Strobe,
    AudioPosReact,
    Enabled,
}

impl LayerParam {
    const ALL: [LayerParam; 6] = [
        LayerParam::Opacity,
        LayerParam::OffsetX,
        LayerParam::OffsetY,
        LayerParam::Strobe,
        LayerParam::AudioPosReact,
        LayerParam::Enabled,
    ];

    fn as_str(self) -> &'static str {
        match self {
            LayerParam::Opacity => "opacity",
            LayerParam::OffsetX => "offsetX",
            LayerParam::OffsetY => "offsetY",
            LayerParam::Strobe => "strobe",
            LayerParam::AudioPosReact => "audioPosReact",
            LayerParam::Enabled => "enabled",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamId {
    Brightness,
    AudioReact,
    CameraZoom,
    CameraRotate,
    MacroEnergy,
    MacroMotion,
    MacroDetail,
    BeatSync,
    BeatSyncIntensity,
    BeatStrobe,
    TransitionDuration,
    /// Zero-based layer index.
    Layer(u8, LayerParam),
}

const GLOBALS: [(ParamId, &str); 11] = [
    (ParamId::Brightness, "brightness"),
    (ParamId::AudioReact, "audioReact"),
    (ParamId::CameraZoom, "cameraZoom"),
    (ParamId::CameraRotate, "cameraRotate"),
    (ParamId::MacroEnergy, "macroEnergy"),
    (ParamId::MacroMotion, "macroMotion"),
    (ParamId::MacroDetail, "macroDetail"),
    (ParamId::BeatSync, "beatSync"),
    (ParamId::BeatSyncIntensity, "beatSyncIntensity"),
    (ParamId::BeatStrobe, "beatStrobe"),
    (ParamId::TransitionDuration, "transitionDuration"),
];

/// Value domain of a parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub toggle: bool,
}

impl ParamRange {
    const fn numeric(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            toggle: false,
        }
    }

    const TOGGLE: ParamRange = ParamRange {
        min: 0.0,
        max: 1.0,
        toggle: true,
    };
}

impl ParamId {
    pub fn range(self) -> ParamRange {
        match self {
            ParamId::Brightness
            | ParamId::MacroEnergy
            | ParamId::MacroMotion
            | ParamId::MacroDetail
            | ParamId::BeatSyncIntensity => ParamRange::numeric(0.0, 1.0),
            ParamId::AudioReact => ParamRange::numeric(AUDIO_REACT_RANGE.0, AUDIO_REACT_RANGE.1),
            ParamId::CameraZoom => ParamRange::numeric(CAMERA_ZOOM_RANGE.0, CAMERA_ZOOM_RANGE.1),
            ParamId::CameraRotate => {
                ParamRange::numeric(CAMERA_ROTATE_RANGE.0, CAMERA_ROTATE_RANGE.1)
            }
            ParamId::TransitionDuration => {
                ParamRange::numeric(TRANSITION_SECS_RANGE.0, TRANSITION_SECS_RANGE.1)
            }
            ParamId::BeatSync | ParamId::BeatStrobe => ParamRange::TOGGLE,
            ParamId::Layer(_, p) => match p {
                LayerParam::Opacity | LayerParam::Strobe => ParamRange::numeric(0.0, 1.0),
                LayerParam::OffsetX | LayerParam::OffsetY => ParamRange::numeric(-1.0, 1.0),
                LayerParam::AudioPosReact | LayerParam::Enabled => ParamRange::TOGGLE,
            },
        }
    }

    pub fn is_toggle(self) -> bool {
        self.range().toggle
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamId::Layer(i, p) => write!(f, "layer{}.{}", *i as usize + 1, p.as_str()),
            other => {
                let name = GLOBALS
                    .iter()
                    .find(|(id, _)| id == other)
                    .map(|(_, n)| *n)
                    .unwrap_or("unknown");
                f.write_str(name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown parameter id `{0}`")]
pub struct UnknownParam(pub String);

impl FromStr for ParamId {
    type Err = UnknownParam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((id, _)) = GLOBALS.iter().find(|(_, n)| *n == s) {
            return Ok(*id);
        }
        let unknown = || UnknownParam(s.to_string());
        let rest = s.strip_prefix("layer").ok_or_else(unknown)?;
        let (num, field) = rest.split_once('.').ok_or_else(unknown)?;
        let n: usize = num.parse().map_err(|_| unknown())?;
        if n == 0 || n > MAX_LAYERS {
            return Err(unknown());
        }
        let param = LayerParam::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == field)
            .ok_or_else(unknown)?;
        Ok(ParamId::Layer((n - 1) as u8, param))
    }
}

impl TryFrom<String> for ParamId {
    type Error = UnknownParam;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ParamId> for String {
    fn from(id: ParamId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_print_and_parse_symmetrically() {
        for (id, name) in GLOBALS {
            assert_eq!(id.to_string(), name);
            assert_eq!(name.parse::<ParamId>(), Ok(id));
        }
        let id: ParamId = "layer3.offsetY".parse().unwrap();
        assert_eq!(id, ParamId::Layer(2, LayerParam::OffsetY));
        assert_eq!(id.to_string(), "layer3.offsetY");
    }

    #[test]
    fn rejects_out_of_range_layers() {
        assert!("layer0.opacity".parse::<ParamId>().is_err());
        assert!("layer5.opacity".parse::<ParamId>().is_err());
        assert!("layer1.hue".parse::<ParamId>().is_err());
        assert!("gain".parse::<ParamId>().is_err());
    }
}
