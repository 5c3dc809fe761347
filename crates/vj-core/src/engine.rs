//! The engine context: every piece of mutable state plus the command queue
//! that is the only way external input reaches it.
//!
//! Hosts push [`Command`]s from their event callbacks and call
//! [`EngineContext::tick`] once per display frame. Commands are drained at
//! the top of the tick, so state never changes while a frame is planned.

use crate::audio::AudioBridge;
use crate::beat::{BeatClock, BpmDetector, Detection, TapTempo};
use crate::compositor::{plan_frame, FrameInputs, FramePlan};
use crate::constants::*;
use crate::controls::{finite_clamp, CustomPalette, GlobalControls, Logo};
use crate::layer::{BlendMode, LayerKind, LayerStore};
use crate::midi::{MidiAction, MidiMapper, MidiMessage};
use crate::mood::MoodId;
use crate::params::{LayerParam, ParamId};
use crate::patterns::{ColorTheme, VisualMode};
use crate::preset::{Preset, PresetLibrary, PresetStorage};
use crate::reactivity::{map_reactivity, ReactivityInput};
use crate::transition::{TransitionEngine, TransitionSettings};
use std::collections::VecDeque;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    AddLayer,
    DuplicateSelected,
    ToggleLayer(usize),
    SelectLayer(usize),
    SelectPrev,
    SelectNext,
    SetParam(ParamId, f32),
    SetLayerMode(usize, VisualMode),
    SetLayerTheme(usize, ColorTheme),
    SetLayerBlend(usize, BlendMode),
    SetLayerKind(usize, LayerKind),
    /// Timestamp of the tap in the host clock.
    TapTempo(f64),
    SetBpm(f32),
    DetectBpm,
    Midi(Vec<u8>),
    ToggleMidiLearn,
    FocusParam(ParamId),
    ClearMidiMappings,
    ApplyMood(MoodId),
    ApplyPreset(Preset),
    SavePreset(String),
    LoadPreset(usize),
    DeletePreset(usize),
    ImportPresets(String),
    SetAutoSwitch { enabled: bool, interval_secs: f32 },
    SetTransition(TransitionSettings),
    SetCustomPalette(Option<[[f32; 3]; 4]>),
    SetLogo(Logo),
}

/// A bulk change deferred behind a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingChange {
    Preset(Preset),
    Mood(MoodId),
}

/// User-visible outcome of a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    LayerLimit,
    LayerAdded(usize),
    PresetSaved(String),
    PresetDeleted(String),
    PresetsImported(usize),
    PresetFailed(String),
    MidiLearn(bool),
    MidiBound { controller: u8, target: ParamId },
    MidiCleared,
    Bpm(f32),
    BpmUndetected,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LayerLimit => write!(f, "Maximum of {} layers reached.", MAX_LAYERS),
            Notice::LayerAdded(i) => write!(f, "Layer {} added.", i + 1),
            Notice::PresetSaved(name) => write!(f, "Saved preset \"{}\".", name),
            Notice::PresetDeleted(name) => write!(f, "Deleted preset \"{}\".", name),
            Notice::PresetsImported(n) => write!(f, "Imported {} presets.", n),
            Notice::PresetFailed(msg) => write!(f, "Preset error: {}", msg),
            Notice::MidiLearn(true) => {
                f.write_str("Click a slider/knob, then move a MIDI control")
            }
            Notice::MidiLearn(false) => f.write_str("MIDI learn off"),
            Notice::MidiBound { controller, target } => {
                write!(f, "Mapped CC{} to {}", controller, target)
            }
            Notice::MidiCleared => f.write_str("MIDI mappings cleared"),
            Notice::Bpm(bpm) => write!(f, "BPM {:.0}", bpm),
            Notice::BpmUndetected => f.write_str("Could not detect BPM"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoSwitch {
    pub enabled: bool,
    pub interval_secs: f32,
    index: usize,
    last_switch_ms: f64,
}

impl AutoSwitch {
    fn new(now_ms: f64) -> Self {
        Self {
            enabled: false,
            interval_secs: DEFAULT_AUTO_SWITCH_SECS,
            index: 0,
            last_switch_ms: now_ms,
        }
    }

    /// Next library index when the interval has elapsed.
    fn due(&mut self, now_ms: f64, library_len: usize) -> Option<usize> {
        if !self.enabled || library_len == 0 {
            return None;
        }
        if (now_ms - self.last_switch_ms) / 1000.0 < self.interval_secs as f64 {
            return None;
        }
        self.index = (self.index + 1) % library_len;
        self.last_switch_ms = now_ms;
        Some(self.index)
    }
}

pub struct EngineContext {
    layers: LayerStore,
    controls: GlobalControls,
    transition_settings: TransitionSettings,
    beat: BeatClock,
    tap: TapTempo,
    detector: BpmDetector,
    transition: TransitionEngine<PendingChange>,
    midi: MidiMapper,
    presets: PresetLibrary,
    auto_switch: AutoSwitch,
    storage: Box<dyn PresetStorage>,
    queue: VecDeque<Command>,
    notices: Vec<Notice>,
    start_ms: f64,
    resolution: [f32; 2],
}

impl EngineContext {
    /// Fresh engine state; presets and MIDI mappings are restored from
    /// `storage`. Unreadable stored data is logged and ignored.
    pub fn new(now_ms: f64, storage: Box<dyn PresetStorage>) -> Self {
        let mut presets = PresetLibrary::new();
        if let Some(json) = storage.load_presets() {
            match presets.load_json(&json) {
                Ok(n) => log::info!("[preset] {} presets loaded", n),
                Err(e) => log::warn!("[preset] stored presets ignored: {}", e),
            }
        }
        let mut midi = MidiMapper::new();
        if let Some(json) = storage.load_midi_mappings() {
            if let Err(e) = midi.load_json(&json) {
                log::warn!("[midi] stored mappings ignored: {}", e);
            }
        }
        let transition_settings = TransitionSettings::default();
        Self {
            layers: LayerStore::new(),
            controls: GlobalControls::default(),
            transition_settings,
            beat: BeatClock::new(now_ms),
            tap: TapTempo::new(),
            detector: BpmDetector::new(),
            transition: TransitionEngine::new(transition_settings.duration_secs),
            midi,
            presets,
            auto_switch: AutoSwitch::new(now_ms),
            storage,
            queue: VecDeque::new(),
            notices: Vec::new(),
            start_ms: now_ms,
            resolution: [1.0, 1.0],
        }
    }

    pub fn push(&mut self, cmd: Command) {
        self.queue.push_back(cmd);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.resolution = [width as f32, height as f32];
        }
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    pub fn controls(&self) -> &GlobalControls {
        &self.controls
    }

    pub fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    pub fn midi(&self) -> &MidiMapper {
        &self.midi
    }

    pub fn transition_settings(&self) -> TransitionSettings {
        self.transition_settings
    }

    pub fn is_transitioning(&self) -> bool {
        !self.transition.is_idle()
    }

    pub fn auto_switch(&self) -> AutoSwitch {
        self.auto_switch
    }

    pub fn bpm(&self) -> f32 {
        self.beat.bpm()
    }

    pub fn beat_clock(&self) -> &BeatClock {
        &self.beat
    }

    pub fn is_detecting_bpm(&self) -> bool {
        self.detector.is_running()
    }

    pub fn capture_preset(&self, name: &str) -> Preset {
        Preset::capture(name, &self.controls, &self.layers)
    }

    /// Run one frame: drain commands, advance clocks, sample audio and plan
    /// the layer draws.
    pub fn tick(&mut self, now_ms: f64, audio: &mut impl AudioBridge) -> FramePlan {
        while let Some(cmd) = self.queue.pop_front() {
            self.apply_command(cmd, now_ms);
        }

        let beat_edge = self.beat.tick(now_ms);
        let step = self.transition.tick(now_ms);
        if let Some(change) = step.completed {
            log::info!("[transition] complete");
            self.apply_change(change);
        }

        let bands = audio.sample();
        if let Some(result) = self.detector.feed(now_ms, bands.bass) {
            match result {
                Detection::Tempo(bpm) => {
                    if self.beat.set_bpm(bpm, now_ms) {
                        self.notices.push(Notice::Bpm(bpm));
                    }
                }
                Detection::Inconclusive => {
                    log::info!("[beat] detection inconclusive");
                    self.notices.push(Notice::BpmUndetected);
                }
            }
        }
        let react = map_reactivity(&ReactivityInput {
            bands,
            audio_react: self.controls.audio_react,
            macro_energy: self.controls.macros.energy,
            macro_detail: self.controls.macros.detail,
            beat_edge,
            beat_sync: self.controls.beat_sync,
            beat_sync_intensity: self.controls.beat_sync_intensity,
        });

        if let Some(i) = self.auto_switch.due(now_ms, self.presets.len()) {
            if let Ok(p) = self.presets.get(i) {
                log::info!("[preset] auto-switch to \"{}\"", p.name);
                let change = PendingChange::Preset(p.clone());
                self.request_change(change, now_ms);
            }
        }

        let inputs = FrameInputs {
            time_secs: ((now_ms - self.start_ms) / 1000.0) as f32,
            resolution: self.resolution,
            react,
            beat_edge,
            beat_phase: self.beat.phase(now_ms) as f32,
            bpm: self.beat.bpm(),
            transition_fade: step.fade,
        };
        plan_frame(&inputs, &self.controls, &self.layers)
    }

    fn request_change(&mut self, change: PendingChange, now_ms: f64) {
        let s = self.transition_settings;
        if !s.enabled || s.duration_secs <= 0.0 {
            self.apply_change(change);
            return;
        }
        let gate = (s.on_beat && self.controls.beat_sync)
            .then(|| self.beat.time_to_next_beat(now_ms));
        log::info!("[transition] start ({:?}, gate {:?})", s.mode, gate);
        self.transition.start(change, now_ms, gate);
    }

    fn apply_change(&mut self, change: PendingChange) {
        match change {
            PendingChange::Preset(p) => {
                p.apply(&mut self.controls, &mut self.layers);
                log::info!("[preset] applied \"{}\"", p.name);
            }
            PendingChange::Mood(id) => id.mood().apply(&mut self.controls, &mut self.layers),
        }
    }

    fn apply_command(&mut self, cmd: Command, now_ms: f64) {
        match cmd {
            Command::AddLayer => match self.layers.add_layer() {
                Ok(i) => self.notices.push(Notice::LayerAdded(i)),
                Err(e) => {
                    log::info!("[layers] {}", e);
                    self.notices.push(Notice::LayerLimit);
                }
            },
            Command::DuplicateSelected => match self.layers.duplicate_selected() {
                Ok(Some(i)) => self.notices.push(Notice::LayerAdded(i)),
                Ok(None) => {}
                Err(e) => {
                    log::info!("[layers] {}", e);
                    self.notices.push(Notice::LayerLimit);
                }
            },
            Command::ToggleLayer(i) => {
                self.layers.toggle_enabled(i);
            }
            Command::SelectLayer(i) => {
                self.layers.select(i);
            }
            Command::SelectPrev => self.layers.select_prev(),
            Command::SelectNext => self.layers.select_next(),
            Command::SetParam(id, v) => self.set_param(id, v),
            Command::SetLayerMode(i, m) => {
                if let Some(l) = self.layers.get_mut(i) {
                    l.visual_mode = m;
                }
            }
            Command::SetLayerTheme(i, t) => {
                if let Some(l) = self.layers.get_mut(i) {
                    l.color_theme = t;
                }
            }
            Command::SetLayerBlend(i, b) => {
                if let Some(l) = self.layers.get_mut(i) {
                    l.blend = b;
                }
            }
            Command::SetLayerKind(i, k) => {
                if let Some(l) = self.layers.get_mut(i) {
                    l.kind = k;
                }
            }
            Command::TapTempo(ts) => {
                if let Some(bpm) = self.tap.tap(ts) {
                    if self.beat.set_bpm(bpm, ts) {
                        self.notices.push(Notice::Bpm(bpm));
                    }
                }
            }
            Command::SetBpm(bpm) => {
                if !self.beat.set_bpm(bpm, now_ms) {
                    log::warn!("[beat] rejected bpm {}", bpm);
                }
            }
            Command::DetectBpm => self.detector.start(now_ms),
            Command::Midi(bytes) => self.handle_midi(&bytes),
            Command::ToggleMidiLearn => {
                let on = self.midi.toggle_learn();
                self.notices.push(Notice::MidiLearn(on));
            }
            Command::FocusParam(id) => self.midi.focus(id),
            Command::ClearMidiMappings => {
                self.midi.clear();
                self.persist_midi();
                self.notices.push(Notice::MidiCleared);
            }
            Command::ApplyMood(id) => self.request_change(PendingChange::Mood(id), now_ms),
            Command::ApplyPreset(p) => self.request_change(PendingChange::Preset(p), now_ms),
            Command::SavePreset(name) => {
                let preset = self.capture_preset(&name);
                match self.presets.save(preset) {
                    Ok(i) => {
                        self.persist_presets();
                        let name = self.presets.presets()[i].name.clone();
                        log::info!("[preset] saved \"{}\"", name);
                        self.notices.push(Notice::PresetSaved(name));
                    }
                    Err(e) => self.preset_failed(e),
                }
            }
            Command::LoadPreset(i) => match self.presets.get(i) {
                Ok(p) => {
                    let change = PendingChange::Preset(p.clone());
                    self.request_change(change, now_ms);
                }
                Err(e) => self.preset_failed(e),
            },
            Command::DeletePreset(i) => match self.presets.delete(i) {
                Ok(p) => {
                    self.persist_presets();
                    self.notices.push(Notice::PresetDeleted(p.name));
                }
                Err(e) => self.preset_failed(e),
            },
            Command::ImportPresets(json) => match self.presets.import_json(&json) {
                Ok(n) => {
                    self.persist_presets();
                    log::info!("[preset] imported {}", n);
                    self.notices.push(Notice::PresetsImported(n));
                }
                Err(e) => self.preset_failed(e),
            },
            Command::SetAutoSwitch {
                enabled,
                interval_secs,
            } => {
                if interval_secs.is_finite() && interval_secs > 0.0 {
                    self.auto_switch.interval_secs = interval_secs;
                }
                if enabled != self.auto_switch.enabled {
                    self.auto_switch.enabled = enabled;
                    self.auto_switch.index = 0;
                    self.auto_switch.last_switch_ms = now_ms;
                }
            }
            Command::SetTransition(mut settings) => {
                settings.duration_secs = finite_clamp(
                    settings.duration_secs,
                    TRANSITION_SECS_RANGE.0,
                    TRANSITION_SECS_RANGE.1,
                    DEFAULT_TRANSITION_SECS,
                );
                self.transition.set_duration(settings.duration_secs);
                self.transition_settings = settings;
            }
            Command::SetCustomPalette(rows) => {
                self.controls.custom_palette = match rows {
                    Some(rows) => CustomPalette { active: true, rows },
                    None => CustomPalette {
                        active: false,
                        ..self.controls.custom_palette
                    },
                };
            }
            Command::SetLogo(logo) => {
                self.controls.logo = logo;
                self.controls.sanitize();
            }
        }
    }

    fn handle_midi(&mut self, bytes: &[u8]) {
        match self.midi.handle(MidiMessage::parse(bytes)) {
            MidiAction::Bound { controller, target } => {
                self.persist_midi();
                self.notices.push(Notice::MidiBound { controller, target });
            }
            MidiAction::SetParam { target, value } => self.set_param(target, value),
            MidiAction::Note { .. } | MidiAction::None => {}
        }
    }

    fn preset_failed(&mut self, e: crate::preset::PresetError) {
        log::warn!("[preset] {}", e);
        self.notices.push(Notice::PresetFailed(e.to_string()));
    }

    fn persist_presets(&mut self) {
        let result = self
            .presets
            .to_json()
            .and_then(|json| self.storage.save_presets(&json));
        if let Err(e) = result {
            log::warn!("[preset] could not persist presets: {}", e);
        }
    }

    fn persist_midi(&mut self) {
        match self.midi.to_json() {
            Ok(json) => {
                if let Err(e) = self.storage.save_midi_mappings(&json) {
                    log::warn!("[midi] could not persist mappings: {}", e);
                }
            }
            Err(e) => log::warn!("[midi] could not encode mappings: {}", e),
        }
    }

    /// Current value of a parameter; toggles read as 0.0/1.0. `None` when
    /// the addressed layer does not exist.
    pub fn param(&self, id: ParamId) -> Option<f32> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let c = &self.controls;
        Some(match id {
            ParamId::Brightness => c.brightness,
            ParamId::AudioReact => c.audio_react,
            ParamId::CameraZoom => c.camera_zoom,
            ParamId::CameraRotate => c.camera_rotate_deg,
            ParamId::MacroEnergy => c.macros.energy,
            ParamId::MacroMotion => c.macros.motion,
            ParamId::MacroDetail => c.macros.detail,
            ParamId::BeatSync => flag(c.beat_sync),
            ParamId::BeatSyncIntensity => c.beat_sync_intensity,
            ParamId::BeatStrobe => flag(c.beat_strobe),
            ParamId::TransitionDuration => self.transition_settings.duration_secs,
            ParamId::Layer(i, p) => {
                let l = self.layers.get(i as usize)?;
                match p {
                    LayerParam::Opacity => l.opacity,
                    LayerParam::OffsetX => l.offset_x,
                    LayerParam::OffsetY => l.offset_y,
                    LayerParam::Strobe => l.strobe_intensity,
                    LayerParam::AudioPosReact => flag(l.audio_position_react),
                    LayerParam::Enabled => flag(l.enabled),
                }
            }
        })
    }

    /// Write a parameter, clamped to its range. Non-finite values and
    /// missing layers are ignored.
    pub fn set_param(&mut self, id: ParamId, value: f32) {
        if !value.is_finite() {
            return;
        }
        let range = id.range();
        let v = value.clamp(range.min, range.max);
        let on = v >= MIDI_TOGGLE_THRESHOLD;
        let c = &mut self.controls;
        match id {
            ParamId::Brightness => c.brightness = v,
            ParamId::AudioReact => c.audio_react = v,
            ParamId::CameraZoom => c.camera_zoom = v,
            ParamId::CameraRotate => c.camera_rotate_deg = v,
            ParamId::MacroEnergy => c.macros.energy = v,
            ParamId::MacroMotion => c.macros.motion = v,
            ParamId::MacroDetail => c.macros.detail = v,
            ParamId::BeatSync => c.beat_sync = on,
            ParamId::BeatSyncIntensity => c.beat_sync_intensity = v,
            ParamId::BeatStrobe => c.beat_strobe = on,
            ParamId::TransitionDuration => {
                self.transition_settings.duration_secs = v;
                self.transition.set_duration(v);
            }
            ParamId::Layer(i, p) => {
                let Some(l) = self.layers.get_mut(i as usize) else {
                    return;
                };
                match p {
                    LayerParam::Opacity => l.opacity = v,
                    LayerParam::OffsetX => l.offset_x = v,
                    LayerParam::OffsetY => l.offset_y = v,
                    LayerParam::Strobe => l.strobe_intensity = v,
                    LayerParam::AudioPosReact => l.audio_position_react = on,
                    LayerParam::Enabled => l.enabled = on,
                }
            }
        }
    }
}
