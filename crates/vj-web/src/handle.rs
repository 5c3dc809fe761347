//! `window.vj`: the control surface the page's UI drives.
//!
//! Every method only queues a [`Command`]; the engine applies it at the top
//! of the next frame.

use crate::audio::AudioPlayer;
use crate::share;
use std::cell::RefCell;
use std::rc::Rc;
use vj_core::controls::{CustomPalette, Logo};
use vj_core::{
    decode_share, encode_share, BlendMode, ColorTheme, Command, EngineContext, LayerKind, MoodId,
    ParamId, TransitionMode, TransitionSettings, VisualMode, SHARE_QUERY_PARAM,
};
use wasm_bindgen::prelude::*;
use web_sys as web;

/// Decode a `?preset=` share link, if present, and queue it. A malformed link
/// is logged and startup continues with the default scene.
pub fn apply_shared_preset(window: &web::Window, engine: &Rc<RefCell<EngineContext>>) {
    let Ok(search) = window.location().search() else {
        return;
    };
    let Some(raw) = web::UrlSearchParams::new_with_str(&search)
        .ok()
        .and_then(|params| params.get(SHARE_QUERY_PARAM))
    else {
        return;
    };
    match decode_share(&share::restore_plus(&raw)) {
        Ok(preset) => {
            log::info!("[preset] loading shared preset \"{}\"", preset.name);
            engine.borrow_mut().push(Command::ApplyPreset(preset));
        }
        Err(e) => log::warn!("[preset] ignoring malformed share link: {}", e),
    }
}

/// Expose `handle` as `window.vj` and announce it with a `vj-ready` event.
pub fn publish(handle: VjHandle) {
    let Some(window) = web::window() else {
        return;
    };
    let key = JsValue::from_str("vj");
    if let Err(e) = js_sys::Reflect::set(&window, &key, &JsValue::from(handle)) {
        log::error!("could not publish window.vj: {:?}", e);
        return;
    }
    if let Ok(ev) = web::Event::new("vj-ready") {
        _ = window.dispatch_event(&ev);
    }
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct VjHandle {
    engine: Rc<RefCell<EngineContext>>,
    player: Rc<AudioPlayer>,
}

impl VjHandle {
    pub fn new(engine: Rc<RefCell<EngineContext>>, player: Rc<AudioPlayer>) -> Self {
        Self { engine, player }
    }

    fn push(&self, cmd: Command) {
        self.engine.borrow_mut().push(cmd);
    }
}

#[wasm_bindgen]
impl VjHandle {
    #[wasm_bindgen(js_name = addLayer)]
    pub fn add_layer(&self) {
        self.push(Command::AddLayer);
    }

    #[wasm_bindgen(js_name = duplicateLayer)]
    pub fn duplicate_layer(&self) {
        self.push(Command::DuplicateSelected);
    }

    #[wasm_bindgen(js_name = toggleLayer)]
    pub fn toggle_layer(&self, index: usize) {
        self.push(Command::ToggleLayer(index));
    }

    #[wasm_bindgen(js_name = selectLayer)]
    pub fn select_layer(&self, index: usize) {
        self.push(Command::SelectLayer(index));
    }

    #[wasm_bindgen(js_name = layerCount)]
    pub fn layer_count(&self) -> usize {
        self.engine.borrow().layers().len()
    }

    #[wasm_bindgen(js_name = selectedLayer)]
    pub fn selected_layer(&self) -> Option<u32> {
        self.engine.borrow().layers().selected().map(|i| i as u32)
    }

    /// `id` is a parameter id such as `brightness` or `layer2.opacity`.
    #[wasm_bindgen(js_name = setParam)]
    pub fn set_param(&self, id: &str, value: f32) -> Result<(), JsValue> {
        let id: ParamId = id.parse().map_err(js_err)?;
        self.push(Command::SetParam(id, value));
        Ok(())
    }

    /// Mark `id` as the control last touched, for MIDI learn.
    #[wasm_bindgen(js_name = focusParam)]
    pub fn focus_param(&self, id: &str) -> Result<(), JsValue> {
        let id: ParamId = id.parse().map_err(js_err)?;
        self.push(Command::FocusParam(id));
        Ok(())
    }

    #[wasm_bindgen(js_name = paramValue)]
    pub fn param_value(&self, id: &str) -> Option<f32> {
        let id: ParamId = id.parse().ok()?;
        self.engine.borrow().param(id)
    }

    #[wasm_bindgen(js_name = setLayerMode)]
    pub fn set_layer_mode(&self, index: usize, mode: u32) {
        self.push(Command::SetLayerMode(index, VisualMode::from_id_clamped(mode)));
    }

    #[wasm_bindgen(js_name = setLayerTheme)]
    pub fn set_layer_theme(&self, index: usize, theme: u32) {
        self.push(Command::SetLayerTheme(index, ColorTheme::from_id_clamped(theme)));
    }

    #[wasm_bindgen(js_name = setLayerBlend)]
    pub fn set_layer_blend(&self, index: usize, blend: &str) {
        self.push(Command::SetLayerBlend(index, BlendMode::from_name(blend)));
    }

    #[wasm_bindgen(js_name = setLayerKind)]
    pub fn set_layer_kind(&self, index: usize, kind: &str) {
        self.push(Command::SetLayerKind(index, LayerKind::from_name(kind)));
    }

    #[wasm_bindgen(js_name = tapTempo)]
    pub fn tap_tempo(&self) {
        self.push(Command::TapTempo(instant::now()));
    }

    #[wasm_bindgen(js_name = setBpm)]
    pub fn set_bpm(&self, bpm: f32) {
        self.push(Command::SetBpm(bpm));
    }

    #[wasm_bindgen(js_name = detectBpm)]
    pub fn detect_bpm(&self) {
        self.push(Command::DetectBpm);
    }

    pub fn bpm(&self) -> f32 {
        self.engine.borrow().bpm()
    }

    #[wasm_bindgen(js_name = toggleMidiLearn)]
    pub fn toggle_midi_learn(&self) {
        self.push(Command::ToggleMidiLearn);
    }

    #[wasm_bindgen(js_name = isMidiLearning)]
    pub fn is_midi_learning(&self) -> bool {
        self.engine.borrow().midi().is_learning()
    }

    #[wasm_bindgen(js_name = clearMidiMappings)]
    pub fn clear_midi_mappings(&self) {
        self.push(Command::ClearMidiMappings);
    }

    #[wasm_bindgen(js_name = applyMood)]
    pub fn apply_mood(&self, name: &str) -> Result<(), JsValue> {
        let mood: MoodId = name.parse().map_err(js_err)?;
        self.push(Command::ApplyMood(mood));
        Ok(())
    }

    #[wasm_bindgen(js_name = savePreset)]
    pub fn save_preset(&self, name: &str) {
        self.push(Command::SavePreset(name.to_string()));
    }

    #[wasm_bindgen(js_name = loadPreset)]
    pub fn load_preset(&self, index: usize) {
        self.push(Command::LoadPreset(index));
    }

    #[wasm_bindgen(js_name = deletePreset)]
    pub fn delete_preset(&self, index: usize) {
        self.push(Command::DeletePreset(index));
    }

    #[wasm_bindgen(js_name = presetNames)]
    pub fn preset_names(&self) -> js_sys::Array {
        self.engine
            .borrow()
            .presets()
            .presets()
            .iter()
            .map(|p| JsValue::from_str(&p.name))
            .collect()
    }

    #[wasm_bindgen(js_name = importPresets)]
    pub fn import_presets(&self, json: String) {
        self.push(Command::ImportPresets(json));
    }

    #[wasm_bindgen(js_name = exportPresets)]
    pub fn export_presets(&self) -> Result<String, JsValue> {
        self.engine.borrow().presets().export_json().map_err(js_err)
    }

    /// Link that reproduces the current scene when opened.
    #[wasm_bindgen(js_name = shareLink)]
    pub fn share_link(&self) -> Result<String, JsValue> {
        let preset = self.engine.borrow().capture_preset("Shared");
        let encoded = encode_share(&preset).map_err(js_err)?;
        let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let location = window.location();
        let component: String = js_sys::encode_uri_component(&encoded).into();
        Ok(share::share_url(
            &location.origin()?,
            &location.pathname()?,
            SHARE_QUERY_PARAM,
            &component,
        ))
    }

    #[wasm_bindgen(js_name = setAutoSwitch)]
    pub fn set_auto_switch(&self, enabled: bool, interval_secs: f32) {
        self.push(Command::SetAutoSwitch {
            enabled,
            interval_secs,
        });
    }

    #[wasm_bindgen(js_name = setTransition)]
    pub fn set_transition(&self, enabled: bool, mode: &str, duration_secs: f32, on_beat: bool) {
        self.push(Command::SetTransition(TransitionSettings {
            enabled,
            mode: TransitionMode::from_name(mode),
            duration_secs,
            on_beat,
        }));
    }

    /// Four `#rrggbb` colors for palette rows A to D.
    #[wasm_bindgen(js_name = setCustomPalette)]
    pub fn set_custom_palette(&self, a: &str, b: &str, c: &str, d: &str) {
        let palette = CustomPalette::from_hex([a, b, c, d]);
        self.push(Command::SetCustomPalette(Some(palette.rows)));
    }

    #[wasm_bindgen(js_name = clearCustomPalette)]
    pub fn clear_custom_palette(&self) {
        self.push(Command::SetCustomPalette(None));
    }

    #[wasm_bindgen(js_name = setLogo)]
    pub fn set_logo(&self, text: String, visible: bool, size: f32) {
        self.push(Command::SetLogo(Logo {
            text,
            visible,
            size,
        }));
    }

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) {
        self.player.toggle_play();
    }

    #[wasm_bindgen(js_name = loadAudioFile)]
    pub fn load_audio_file(&self, file: web::File) {
        self.player.load_file(&file);
    }
}
