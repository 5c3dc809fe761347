//! Controller input: message parsing, the mapping table and learn mode.

use crate::constants::{MIDI_DATA_MAX, MIDI_TOGGLE_THRESHOLD, MIDI_VALUE_MAX};
use crate::params::ParamId;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("midi access unavailable: {0}")]
    Unavailable(String),
    #[error("malformed mapping table: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiMessage {
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    /// Velocity is always non-zero; a zero-velocity note-on is a note-off.
    NoteOn { channel: u8, note: u8, velocity: u8 },
    Other,
}

impl MidiMessage {
    pub fn parse(bytes: &[u8]) -> Self {
        let &[status, data1, data2, ..] = bytes else {
            return MidiMessage::Other;
        };
        let channel = status & 0x0f;
        match status >> 4 {
            0xB => MidiMessage::ControlChange {
                channel,
                controller: data1 & 0x7f,
                value: data2 & 0x7f,
            },
            0x9 if data2 > 0 => MidiMessage::NoteOn {
                channel,
                note: data1 & 0x7f,
                velocity: data2 & 0x7f,
            },
            _ => MidiMessage::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MidiMapping {
    pub target: ParamId,
    pub min: f32,
    pub max: f32,
}

impl MidiMapping {
    /// Mapping over the parameter's natural range.
    pub fn for_param(target: ParamId) -> Self {
        let r = target.range();
        Self {
            target,
            min: r.min,
            max: r.max,
        }
    }

    /// Scale a 7-bit controller value into the bound range.
    pub fn scale(&self, value: u8) -> f32 {
        let norm = f32::from(value.min(MIDI_DATA_MAX)) / MIDI_VALUE_MAX;
        if self.target.is_toggle() {
            if norm > MIDI_TOGGLE_THRESHOLD {
                1.0
            } else {
                0.0
            }
        } else {
            self.min + norm * (self.max - self.min)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LearnState {
    #[default]
    Normal,
    /// Waiting for a controller; `focused` is the last parameter touched.
    Learning { focused: Option<ParamId> },
}

/// What the engine should do with one incoming message.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MidiAction {
    None,
    /// A learn completed; the table changed and should be persisted.
    Bound { controller: u8, target: ParamId },
    SetParam { target: ParamId, value: f32 },
    Note { note: u8, velocity: u8 },
}

#[derive(Clone, Debug, Default)]
pub struct MidiMapper {
    table: FnvHashMap<u8, MidiMapping>,
    learn: LearnState,
}

impl MidiMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn learn_state(&self) -> LearnState {
        self.learn
    }

    pub fn is_learning(&self) -> bool {
        matches!(self.learn, LearnState::Learning { .. })
    }

    /// Enter or cancel learn mode; returns whether learning is now active.
    pub fn toggle_learn(&mut self) -> bool {
        self.learn = match self.learn {
            LearnState::Normal => LearnState::Learning { focused: None },
            LearnState::Learning { .. } => LearnState::Normal,
        };
        log::info!("[midi] learn {}", if self.is_learning() { "on" } else { "off" });
        self.is_learning()
    }

    /// Record the last interacted parameter. Ignored outside learn mode.
    pub fn focus(&mut self, param: ParamId) {
        if let LearnState::Learning { focused } = &mut self.learn {
            *focused = Some(param);
        }
    }

    pub fn mapping(&self, controller: u8) -> Option<&MidiMapping> {
        self.table.get(&controller)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn bind(&mut self, controller: u8, mapping: MidiMapping) {
        self.table.insert(controller, mapping);
    }

    pub fn clear(&mut self) {
        self.table.clear();
        log::info!("[midi] mappings cleared");
    }

    pub fn handle(&mut self, msg: MidiMessage) -> MidiAction {
        match msg {
            MidiMessage::ControlChange {
                controller, value, ..
            } => {
                if let LearnState::Learning {
                    focused: Some(target),
                } = self.learn
                {
                    self.table
                        .insert(controller, MidiMapping::for_param(target));
                    self.learn = LearnState::Normal;
                    log::info!("[midi] mapped CC{} to {}", controller, target);
                    return MidiAction::Bound { controller, target };
                }
                match self.table.get(&controller) {
                    Some(m) => MidiAction::SetParam {
                        target: m.target,
                        value: m.scale(value),
                    },
                    None => MidiAction::None,
                }
            }
            MidiMessage::NoteOn { note, velocity, .. } => {
                log::debug!("[midi] note {} velocity {}", note, velocity);
                MidiAction::Note { note, velocity }
            }
            MidiMessage::Other => MidiAction::None,
        }
    }

    /// `{ "<cc>": { "target": "<param>", "min": f, "max": f } }`, keys ascending.
    pub fn to_json(&self) -> Result<String, MidiError> {
        let sorted: BTreeMap<u8, &MidiMapping> = self.table.iter().map(|(k, v)| (*k, v)).collect();
        Ok(serde_json::to_string(&sorted)?)
    }

    /// Replace the table from its stored form. Entries with an unknown
    /// controller number or target are skipped.
    pub fn load_json(&mut self, json: &str) -> Result<usize, MidiError> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut table = FnvHashMap::default();
        for (key, value) in raw {
            let Ok(cc) = key.parse::<u8>() else {
                log::warn!("[midi] skipping mapping with bad controller `{}`", key);
                continue;
            };
            match serde_json::from_value::<MidiMapping>(value) {
                Ok(m) if cc <= MIDI_DATA_MAX => {
                    table.insert(cc, m);
                }
                Ok(_) => log::warn!("[midi] skipping controller {} out of range", cc),
                Err(e) => log::warn!("[midi] skipping CC{}: {}", cc, e),
            }
        }
        self.table = table;
        log::info!("[midi] {} mappings loaded", self.table.len());
        Ok(self.table.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LayerParam;

    #[test]
    fn parses_message_types() {
        assert_eq!(
            MidiMessage::parse(&[0xB3, 7, 64]),
            MidiMessage::ControlChange {
                channel: 3,
                controller: 7,
                value: 64
            }
        );
        assert_eq!(
            MidiMessage::parse(&[0x90, 60, 100]),
            MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100
            }
        );
        assert_eq!(MidiMessage::parse(&[0x90, 60, 0]), MidiMessage::Other);
        assert_eq!(MidiMessage::parse(&[0xB0, 7]), MidiMessage::Other);
        assert_eq!(MidiMessage::parse(&[0xE0, 0, 64]), MidiMessage::Other);
    }

    #[test]
    fn learning_without_focus_keeps_listening() {
        let mut m = MidiMapper::new();
        m.toggle_learn();
        let act = m.handle(MidiMessage::parse(&[0xB0, 20, 90]));
        assert_eq!(act, MidiAction::None);
        assert!(m.is_learning());
        assert!(m.is_empty());
    }

    #[test]
    fn focus_is_ignored_outside_learn() {
        let mut m = MidiMapper::new();
        m.focus(ParamId::Brightness);
        assert_eq!(m.learn_state(), LearnState::Normal);
        m.toggle_learn();
        m.focus(ParamId::Brightness);
        m.toggle_learn();
        m.toggle_learn();
        assert_eq!(m.learn_state(), LearnState::Learning { focused: None });
    }

    #[test]
    fn toggles_threshold_at_half() {
        let map = MidiMapping::for_param(ParamId::Layer(0, LayerParam::Enabled));
        assert_eq!(map.scale(64), 1.0);
        assert_eq!(map.scale(63), 0.0);
        let zoom = MidiMapping::for_param(ParamId::CameraZoom);
        assert!((zoom.scale(127) - 4.0).abs() < 1e-6);
        assert!((zoom.scale(0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn data_bytes_past_127_clamp_and_high_controllers_are_dropped() {
        let bright = MidiMapping::for_param(ParamId::Brightness);
        assert_eq!(bright.scale(200), bright.scale(127));
        assert!((bright.scale(127) - 1.0).abs() < 1e-6);

        let mut m = MidiMapper::new();
        let json = r#"{"127":{"target":"brightness","min":0,"max":1},
                       "128":{"target":"brightness","min":0,"max":1}}"#;
        assert_eq!(m.load_json(json).unwrap(), 1);
        assert!(m.mapping(127).is_some());
        assert!(m.mapping(128).is_none());
    }

    #[test]
    fn table_survives_storage() {
        let mut m = MidiMapper::new();
        m.bind(7, MidiMapping::for_param(ParamId::Brightness));
        m.bind(21, MidiMapping::for_param(ParamId::Layer(1, LayerParam::OffsetX)));
        let json = m.to_json().unwrap();
        assert!(json.contains("\"layer2.offsetX\""));

        let mut restored = MidiMapper::new();
        assert_eq!(restored.load_json(&json).unwrap(), 2);
        assert_eq!(restored.mapping(7), m.mapping(7));
        assert_eq!(restored.mapping(21), m.mapping(21));
    }

    #[test]
    fn load_skips_bad_entries() {
        let mut m = MidiMapper::new();
        let json = r#"{"7":{"target":"brightness","min":0,"max":1},
                       "x":{"target":"brightness","min":0,"max":1},
                       "9":{"target":"warp","min":0,"max":1}}"#;
        assert_eq!(m.load_json(json).unwrap(), 1);
        assert!(m.load_json("[1,2]").is_err());
    }
}
