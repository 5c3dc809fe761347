//! Preset snapshots, the named preset library, share links and storage.

use crate::constants::*;
use crate::controls::{finite_clamp, GlobalControls};
use crate::layer::{Layer, LayerStore};
use crate::lenient;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("preset name is empty")]
    EmptyName,
    #[error("no preset at index {0}")]
    NoSuchPreset(usize),
    #[error("preset file must contain a JSON array")]
    NotAnArray,
    #[error("invalid preset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("share link is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("share link is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("share link does not hold a preset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot of the global look plus every layer. Missing or `null` fields
/// load as their defaults; run [`Preset::sanitized`] before trusting values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preset {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient::f32_or_nan")]
    pub brightness: f32,
    #[serde(deserialize_with = "lenient::f32_or_nan")]
    pub camera_zoom: f32,
    #[serde(deserialize_with = "lenient::f32_or_nan")]
    pub camera_rotate_deg: f32,
    #[serde(deserialize_with = "lenient::f32_or_nan")]
    pub audio_react: f32,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub logo_text: String,
    #[serde(deserialize_with = "lenient::bool_or_false")]
    pub logo_visible: bool,
    #[serde(deserialize_with = "lenient::f32_or_nan")]
    pub logo_size: f32,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub layers: Vec<Layer>,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: String::new(),
            brightness: DEFAULT_BRIGHTNESS,
            camera_zoom: DEFAULT_CAMERA_ZOOM,
            camera_rotate_deg: 0.0,
            audio_react: DEFAULT_AUDIO_REACT,
            logo_text: String::new(),
            logo_visible: false,
            logo_size: DEFAULT_LOGO_SIZE,
            layers: Vec::new(),
        }
    }
}

impl Preset {
    pub fn capture(name: impl Into<String>, controls: &GlobalControls, store: &LayerStore) -> Self {
        Self {
            name: name.into(),
            brightness: controls.brightness,
            camera_zoom: controls.camera_zoom,
            camera_rotate_deg: controls.camera_rotate_deg,
            audio_react: controls.audio_react,
            logo_text: controls.logo.text.clone(),
            logo_visible: controls.logo.visible,
            logo_size: controls.logo.size,
            layers: store.layers().to_vec(),
        }
    }

    /// Clamp numeric fields into their control ranges. NaN and infinities
    /// fall back to the defaults.
    pub fn sanitized(mut self) -> Self {
        self.brightness = finite_clamp(self.brightness, 0.0, 1.0, DEFAULT_BRIGHTNESS);
        self.camera_zoom = finite_clamp(
            self.camera_zoom,
            CAMERA_ZOOM_RANGE.0,
            CAMERA_ZOOM_RANGE.1,
            DEFAULT_CAMERA_ZOOM,
        );
        self.camera_rotate_deg = finite_clamp(
            self.camera_rotate_deg,
            CAMERA_ROTATE_RANGE.0,
            CAMERA_ROTATE_RANGE.1,
            0.0,
        );
        self.audio_react = finite_clamp(
            self.audio_react,
            AUDIO_REACT_RANGE.0,
            AUDIO_REACT_RANGE.1,
            DEFAULT_AUDIO_REACT,
        );
        if !self.logo_size.is_finite() || self.logo_size <= 0.0 {
            self.logo_size = DEFAULT_LOGO_SIZE;
        }
        self.layers = self.layers.into_iter().map(Layer::sanitized).collect();
        self
    }

    /// Replace the store's layers and the preset-owned global values.
    /// Macros, beat sync and the custom palette are left alone.
    pub fn apply(&self, controls: &mut GlobalControls, store: &mut LayerStore) {
        controls.brightness = self.brightness;
        controls.camera_zoom = self.camera_zoom;
        controls.camera_rotate_deg = self.camera_rotate_deg;
        controls.audio_react = self.audio_react;
        controls.logo.text = self.logo_text.clone();
        controls.logo.visible = self.logo_visible;
        controls.logo.size = self.logo_size;
        controls.sanitize();
        store.replace_all(self.layers.clone());
        store.select(0);
    }
}

pub fn encode_share(preset: &Preset) -> Result<String, ShareError> {
    let json = serde_json::to_string(preset)?;
    Ok(BASE64.encode(json.as_bytes()))
}

/// Inverse of [`encode_share`]. The argument must already be URL-decoded.
pub fn decode_share(param: &str) -> Result<Preset, ShareError> {
    let bytes = BASE64.decode(param.trim())?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str::<Preset>(&json)?.sanitized())
}

/// Key/value persistence supplied by the host.
pub trait PresetStorage {
    fn load_presets(&self) -> Option<String>;
    fn save_presets(&mut self, json: &str) -> Result<(), PresetError>;
    fn load_midi_mappings(&self) -> Option<String>;
    fn save_midi_mappings(&mut self, json: &str) -> Result<(), PresetError>;
}

/// Storage that lives only as long as the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    pub presets: Option<String>,
    pub midi: Option<String>,
}

impl PresetStorage for MemoryStorage {
    fn load_presets(&self) -> Option<String> {
        self.presets.clone()
    }

    fn save_presets(&mut self, json: &str) -> Result<(), PresetError> {
        self.presets = Some(json.to_string());
        Ok(())
    }

    fn load_midi_mappings(&self) -> Option<String> {
        self.midi.clone()
    }

    fn save_midi_mappings(&mut self, json: &str) -> Result<(), PresetError> {
        self.midi = Some(json.to_string());
        Ok(())
    }
}

/// Ordered list of named presets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresetLibrary {
    presets: Vec<Preset>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Preset, PresetError> {
        self.presets
            .get(index)
            .ok_or(PresetError::NoSuchPreset(index))
    }

    /// Store `preset` under its (trimmed) name, replacing a same-named entry.
    pub fn save(&mut self, mut preset: Preset) -> Result<usize, PresetError> {
        let name = preset.name.trim();
        if name.is_empty() {
            return Err(PresetError::EmptyName);
        }
        preset.name = name.to_string();
        if let Some(i) = self.presets.iter().position(|p| p.name == preset.name) {
            self.presets[i] = preset;
            Ok(i)
        } else {
            self.presets.push(preset);
            Ok(self.presets.len() - 1)
        }
    }

    pub fn delete(&mut self, index: usize) -> Result<Preset, PresetError> {
        if index >= self.presets.len() {
            return Err(PresetError::NoSuchPreset(index));
        }
        Ok(self.presets.remove(index))
    }

    pub fn export_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(&self.presets)?)
    }

    /// Append every readable preset from a JSON array; returns how many were added.
    pub fn import_json(&mut self, json: &str) -> Result<usize, PresetError> {
        let incoming = parse_preset_array(json)?;
        let n = incoming.len();
        self.presets.extend(incoming);
        Ok(n)
    }

    /// Replace the library from its stored form. Unreadable entries are
    /// skipped so the rest survive the next save.
    pub fn load_json(&mut self, json: &str) -> Result<usize, PresetError> {
        self.presets = parse_preset_array(json)?;
        Ok(self.presets.len())
    }

    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string(&self.presets)?)
    }
}

fn parse_preset_array(json: &str) -> Result<Vec<Preset>, PresetError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(entries) = value else {
        return Err(PresetError::NotAnArray);
    };
    let mut presets = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Preset>(entry) {
            Ok(p) => presets.push(p.sanitized()),
            Err(e) => log::warn!("[preset] skipping entry {}: {}", i, e),
        }
    }
    Ok(presets)
}
