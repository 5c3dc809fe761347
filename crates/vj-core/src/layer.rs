//! Layer records and the bounded, ordered store that owns them.

use crate::constants::MAX_LAYERS;
use crate::controls::finite_clamp;
use crate::lenient;
use crate::patterns::{ColorTheme, VisualMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Screen,
    Multiply,
    Overlay,
    Subtract,
    Dodge,
    Burn,
    Difference,
}

impl BlendMode {
    pub const ALL: [BlendMode; 9] = [
        BlendMode::Normal,
        BlendMode::Add,
        BlendMode::Screen,
        BlendMode::Multiply,
        BlendMode::Overlay,
        BlendMode::Subtract,
        BlendMode::Dodge,
        BlendMode::Burn,
        BlendMode::Difference,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Add => "add",
            BlendMode::Screen => "screen",
            BlendMode::Multiply => "multiply",
            BlendMode::Overlay => "overlay",
            BlendMode::Subtract => "subtract",
            BlendMode::Dodge => "dodge",
            BlendMode::Burn => "burn",
            BlendMode::Difference => "difference",
        }
    }

    /// Unknown names fall back to `normal`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for BlendMode {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<BlendMode> for String {
    fn from(b: BlendMode) -> Self {
        b.as_str().to_string()
    }
}

/// Background layers paint opaque fills; object layers carry intensity alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerKind {
    #[default]
    Background,
    Object,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Background => "shader",
            LayerKind::Object => "object",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "object" => LayerKind::Object,
            _ => LayerKind::Background,
        }
    }
}

impl From<String> for LayerKind {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<LayerKind> for String {
    fn from(k: LayerKind) -> Self {
        k.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Layer {
    #[serde(deserialize_with = "lenient::bool_or_true")]
    pub enabled: bool,
    #[serde(deserialize_with = "lenient::f32_or_nan")]
    pub opacity: f32,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub blend: BlendMode,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub kind: LayerKind,
    pub visual_mode: VisualMode,
    pub color_theme: ColorTheme,
    #[serde(deserialize_with = "lenient::f32_or_nan")]
    pub offset_x: f32,
    #[serde(deserialize_with = "lenient::f32_or_nan")]
    pub offset_y: f32,
    #[serde(deserialize_with = "lenient::bool_or_false")]
    pub audio_position_react: bool,
    #[serde(deserialize_with = "lenient::f32_or_nan")]
    pub strobe_intensity: f32,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            enabled: true,
            opacity: 1.0,
            blend: BlendMode::Normal,
            kind: LayerKind::Background,
            visual_mode: VisualMode::RadialWaves,
            color_theme: ColorTheme::Cool,
            offset_x: 0.0,
            offset_y: 0.0,
            audio_position_react: false,
            strobe_intensity: 0.0,
        }
    }
}

impl Layer {
    /// Clamp numeric fields into their documented ranges; NaN falls back to defaults.
    pub fn sanitized(mut self) -> Self {
        self.opacity = finite_clamp(self.opacity, 0.0, 1.0, 1.0);
        self.offset_x = finite_clamp(self.offset_x, -1.0, 1.0, 0.0);
        self.offset_y = finite_clamp(self.offset_y, -1.0, 1.0, 0.0);
        self.strobe_intensity = finite_clamp(self.strobe_intensity, 0.0, 1.0, 0.0);
        self
    }

    pub fn is_visible(&self) -> bool {
        self.enabled && self.opacity > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("layer limit reached ({max} layers)")]
pub struct LayerLimit {
    pub max: usize,
}

/// Ordered (back to front) collection of at most [`MAX_LAYERS`] layers.
///
/// The store always holds at least one layer.
#[derive(Clone, Debug)]
pub struct LayerStore {
    layers: Vec<Layer>,
    selected: Option<usize>,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    pub fn new() -> Self {
        Self {
            layers: vec![Layer::default()],
            selected: Some(0),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.iter_mut()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn add_layer(&mut self) -> Result<usize, LayerLimit> {
        self.push(Layer::default())
    }

    pub fn duplicate_selected(&mut self) -> Result<Option<usize>, LayerLimit> {
        let Some(src) = self.selected.and_then(|i| self.layers.get(i)).cloned() else {
            return Ok(None);
        };
        self.push(src).map(Some)
    }

    fn push(&mut self, layer: Layer) -> Result<usize, LayerLimit> {
        if self.layers.len() >= MAX_LAYERS {
            return Err(LayerLimit { max: MAX_LAYERS });
        }
        self.layers.push(layer.sanitized());
        let idx = self.layers.len() - 1;
        if self.selected.is_none() {
            self.selected = Some(0);
        }
        Ok(idx)
    }

    /// Flip `enabled`; returns the new state.
    pub fn toggle_enabled(&mut self, index: usize) -> Option<bool> {
        let layer = self.layers.get_mut(index)?;
        layer.enabled = !layer.enabled;
        Some(layer.enabled)
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.layers.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn select_prev(&mut self) {
        let cur = self.selected.unwrap_or(0);
        self.selected = Some(cur.saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        let last = self.layers.len().saturating_sub(1);
        let next = self.selected.map(|i| i + 1).unwrap_or(0);
        self.selected = Some(next.min(last));
    }

    /// Full replacement (preset load). Empty input yields one default layer;
    /// anything past the limit is dropped.
    pub fn replace_all(&mut self, layers: Vec<Layer>) {
        let mut layers: Vec<Layer> = layers
            .into_iter()
            .take(MAX_LAYERS)
            .map(Layer::sanitized)
            .collect();
        if layers.is_empty() {
            layers.push(Layer::default());
        }
        let last = layers.len() - 1;
        self.layers = layers;
        self.selected = Some(self.selected.unwrap_or(0).min(last));
    }

    /// Layers that produce a draw this frame, in paint order.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_visible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_names_parse_leniently() {
        assert_eq!(BlendMode::from_name("Screen"), BlendMode::Screen);
        assert_eq!(BlendMode::from_name("difference"), BlendMode::Difference);
        assert_eq!(BlendMode::from_name("luminosity"), BlendMode::Normal);
    }

    #[test]
    fn kind_accepts_shader_alias() {
        assert_eq!(LayerKind::from_name("shader"), LayerKind::Background);
        assert_eq!(LayerKind::from_name("background"), LayerKind::Background);
        assert_eq!(LayerKind::from_name("OBJECT"), LayerKind::Object);
    }

    #[test]
    fn sanitize_clamps_and_repairs_nan() {
        let l = Layer {
            opacity: 3.0,
            offset_x: -4.0,
            offset_y: f32::NAN,
            strobe_intensity: -1.0,
            ..Layer::default()
        }
        .sanitized();
        assert_eq!(l.opacity, 1.0);
        assert_eq!(l.offset_x, -1.0);
        assert_eq!(l.offset_y, 0.0);
        assert_eq!(l.strobe_intensity, 0.0);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut s = LayerStore::new();
        s.add_layer().unwrap();
        s.select_next();
        s.select_next();
        assert_eq!(s.selected(), Some(1));
        s.select_prev();
        s.select_prev();
        assert_eq!(s.selected(), Some(0));
        assert!(!s.select(3));
    }
}
