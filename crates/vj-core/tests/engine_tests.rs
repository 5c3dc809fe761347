use std::cell::RefCell;
use std::rc::Rc;
use vj_core::preset::PresetError;
use vj_core::transition::TransitionSettings;
use vj_core::*;

/// Storage handle the test keeps a second reference to.
#[derive(Clone, Default)]
struct SharedStorage(Rc<RefCell<MemoryStorage>>);

impl PresetStorage for SharedStorage {
    fn load_presets(&self) -> Option<String> {
        self.0.borrow().load_presets()
    }
    fn save_presets(&mut self, json: &str) -> Result<(), PresetError> {
        self.0.borrow_mut().save_presets(json)
    }
    fn load_midi_mappings(&self) -> Option<String> {
        self.0.borrow().load_midi_mappings()
    }
    fn save_midi_mappings(&mut self, json: &str) -> Result<(), PresetError> {
        self.0.borrow_mut().save_midi_mappings(json)
    }
}

fn engine() -> EngineContext {
    EngineContext::new(0.0, Box::new(MemoryStorage::default()))
}

fn no_fade() -> Command {
    Command::SetTransition(TransitionSettings {
        enabled: false,
        ..TransitionSettings::default()
    })
}

#[test]
fn fifth_layer_is_refused_with_a_notice() {
    let mut e = engine();
    for _ in 0..4 {
        e.push(Command::AddLayer);
    }
    e.tick(0.0, &mut Silence);
    assert_eq!(e.layers().len(), 4);
    let notices = e.take_notices();
    assert_eq!(notices.last(), Some(&Notice::LayerLimit));
    assert_eq!(
        notices.iter().filter(|n| matches!(n, Notice::LayerAdded(_))).count(),
        3
    );

    e.push(Command::DuplicateSelected);
    e.tick(16.0, &mut Silence);
    assert_eq!(e.layers().len(), 4);
    assert_eq!(e.take_notices(), vec![Notice::LayerLimit]);
}

#[test]
fn preset_round_trip_restores_everything() {
    let mut e = engine();
    e.push(Command::AddLayer);
    e.push(Command::AddLayer);
    e.push(Command::SetParam(ParamId::Brightness, 0.8));
    e.push(Command::SetParam(ParamId::CameraZoom, 2.5));
    e.push(Command::SetParam(ParamId::CameraRotate, -30.0));
    e.push(Command::SetParam(ParamId::Layer(1, LayerParam::OffsetX), 0.4));
    e.push(Command::SetParam(ParamId::Layer(2, LayerParam::Enabled), 0.0));
    e.push(Command::SetLayerMode(1, VisualMode::DnaHelix));
    e.push(Command::SetLayerBlend(2, BlendMode::Difference));
    e.push(Command::SetLayerKind(2, LayerKind::Object));
    e.push(no_fade());
    e.tick(0.0, &mut Silence);

    let snapshot = e.capture_preset("x");
    let layers_before = e.layers().layers().to_vec();
    let controls_before = e.controls().clone();

    e.push(Command::ApplyMood(MoodId::Psy));
    e.push(Command::AddLayer);
    e.tick(16.0, &mut Silence);
    assert_ne!(e.layers().layers(), &layers_before[..]);

    e.push(Command::ApplyPreset(snapshot));
    e.tick(32.0, &mut Silence);
    assert_eq!(e.layers().layers(), &layers_before[..]);
    assert_eq!(e.controls(), &controls_before);
}

#[test]
fn empty_preset_leaves_one_default_layer() {
    let mut e = engine();
    e.push(Command::AddLayer);
    e.push(no_fade());
    e.push(Command::ApplyPreset(Preset::default()));
    e.tick(0.0, &mut Silence);
    assert_eq!(e.layers().layers(), &[Layer::default()]);
}

#[test]
fn midi_learn_binds_and_scales() {
    let storage = SharedStorage::default();
    let mut e = EngineContext::new(0.0, Box::new(storage.clone()));
    e.push(Command::ToggleMidiLearn);
    e.push(Command::FocusParam(ParamId::Brightness));
    e.push(Command::Midi(vec![0xB0, 7, 127]));
    e.tick(0.0, &mut Silence);
    assert!(!e.midi().is_learning());
    assert!(e.take_notices().contains(&Notice::MidiBound {
        controller: 7,
        target: ParamId::Brightness
    }));

    e.push(Command::Midi(vec![0xB0, 7, 127]));
    e.tick(16.0, &mut Silence);
    assert_eq!(e.param(ParamId::Brightness), Some(1.0));
    e.push(Command::Midi(vec![0xB0, 7, 0]));
    e.tick(32.0, &mut Silence);
    assert_eq!(e.param(ParamId::Brightness), Some(0.0));

    // mappings come back after a reload
    let mut reloaded = EngineContext::new(0.0, Box::new(storage.clone()));
    reloaded.push(Command::Midi(vec![0xB2, 7, 127]));
    reloaded.tick(0.0, &mut Silence);
    assert_eq!(reloaded.param(ParamId::Brightness), Some(1.0));

    reloaded.push(Command::ClearMidiMappings);
    reloaded.tick(16.0, &mut Silence);
    assert!(reloaded.midi().is_empty());
    assert_eq!(storage.0.borrow().midi.as_deref(), Some("{}"));
}

#[test]
fn midi_to_missing_layer_is_ignored() {
    let mut e = engine();
    e.push(Command::ToggleMidiLearn);
    e.push(Command::FocusParam(ParamId::Layer(3, LayerParam::Opacity)));
    e.push(Command::Midi(vec![0xB0, 20, 10]));
    e.push(Command::Midi(vec![0xB0, 20, 0]));
    e.tick(0.0, &mut Silence);
    assert_eq!(e.layers().len(), 1);
    assert_eq!(e.param(ParamId::Layer(3, LayerParam::Opacity)), None);
}

#[test]
fn mood_waits_for_the_transition() {
    let mut e = engine();
    let plan = {
        e.push(Command::ApplyMood(MoodId::Edm));
        e.tick(0.0, &mut Silence)
    };
    assert_eq!(plan.transition_fade, 0.0);
    assert_eq!(e.controls().brightness, 0.5);

    let plan = e.tick(500.0, &mut Silence);
    assert!((plan.transition_fade - 0.5).abs() < 1e-6);
    assert!(e.is_transitioning());

    let plan = e.tick(1000.0, &mut Silence);
    assert_eq!(plan.transition_fade, 1.0);
    assert_eq!(e.controls().brightness, 0.95);
    assert_eq!(e.layers().layers()[0].visual_mode, VisualMode::AudioBars);
    assert!(!e.is_transitioning());
}

#[test]
fn beat_gated_transition_starts_on_the_next_edge() {
    let mut e = engine();
    e.push(Command::SetParam(ParamId::BeatSync, 1.0));
    e.push(Command::SetTransition(TransitionSettings {
        on_beat: true,
        duration_secs: 0.5,
        ..TransitionSettings::default()
    }));
    e.push(Command::ApplyMood(MoodId::Techno));
    // 120 bpm from t=0: next edge at 500 ms
    assert_eq!(e.tick(100.0, &mut Silence).transition_fade, 1.0);
    assert_eq!(e.tick(499.0, &mut Silence).transition_fade, 1.0);
    assert!(e.tick(501.0, &mut Silence).transition_fade < 0.01);
    e.tick(999.0, &mut Silence);
    assert_eq!(e.controls().brightness, 0.5);
    e.tick(1001.0, &mut Silence);
    assert_eq!(e.controls().brightness, 0.6);
}

#[test]
fn tap_commands_set_the_clock() {
    let mut e = engine();
    for t in [0.0, 600.0, 1200.0, 1800.0] {
        e.push(Command::TapTempo(t));
    }
    e.tick(1800.0, &mut Silence);
    assert!((e.bpm() - 100.0).abs() < 1e-3);
    assert!(matches!(e.take_notices().last(), Some(Notice::Bpm(_))));
}

#[test]
fn presets_persist_and_auto_switch_cycles() {
    let storage = SharedStorage::default();
    let mut e = EngineContext::new(0.0, Box::new(storage.clone()));
    e.push(no_fade());
    e.push(Command::SetParam(ParamId::Brightness, 0.1));
    e.push(Command::SavePreset("dark".into()));
    e.push(Command::SetParam(ParamId::Brightness, 0.9));
    e.push(Command::SavePreset("bright".into()));
    e.push(Command::SavePreset("   ".into()));
    e.tick(0.0, &mut Silence);
    assert_eq!(e.presets().len(), 2);
    assert!(matches!(
        e.take_notices().last(),
        Some(Notice::PresetFailed(_))
    ));

    let reloaded = EngineContext::new(0.0, Box::new(storage.clone()));
    assert_eq!(reloaded.presets(), e.presets());

    e.push(Command::SetAutoSwitch {
        enabled: true,
        interval_secs: 2.0,
    });
    e.push(Command::SetParam(ParamId::Brightness, 0.5));
    e.tick(1000.0, &mut Silence);
    e.tick(2999.0, &mut Silence);
    assert_eq!(e.controls().brightness, 0.5);
    e.tick(3000.0, &mut Silence);
    assert_eq!(e.controls().brightness, 0.9);
    e.tick(5000.0, &mut Silence);
    assert_eq!(e.controls().brightness, 0.1);
}

#[test]
fn damaged_stored_library_keeps_readable_presets_across_saves() {
    let storage = SharedStorage::default();
    storage.0.borrow_mut().presets = Some(
        r#"[{"name":"keep1"},
            {"name":"keep2","brightness":null,"layers":[{"visualMode":-1}]},
            "junk"]"#
            .into(),
    );
    let mut e = EngineContext::new(0.0, Box::new(storage.clone()));
    assert_eq!(e.presets().len(), 2);

    e.push(Command::SavePreset("new".into()));
    e.tick(16.0, &mut Silence);

    let stored = storage.0.borrow().presets.clone().unwrap();
    let mut reloaded = PresetLibrary::new();
    assert_eq!(reloaded.load_json(&stored).unwrap(), 3);
    let names: Vec<&str> = reloaded.presets().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["keep1", "keep2", "new"]);
    assert_eq!(reloaded.presets()[1].brightness, DEFAULT_BRIGHTNESS);
}

#[test]
fn import_and_delete_report_outcomes() {
    let mut e = engine();
    e.push(Command::ImportPresets(r#"[{"name":"a"},{"name":"b"}]"#.into()));
    e.push(Command::ImportPresets(r#"{"name":"c"}"#.into()));
    e.push(Command::ImportPresets(r#"[{"name":"d","opacity":null}, 5]"#.into()));
    e.push(Command::DeletePreset(0));
    e.push(Command::DeletePreset(9));
    e.tick(0.0, &mut Silence);
    let notices = e.take_notices();
    assert_eq!(notices[0], Notice::PresetsImported(2));
    assert!(matches!(notices[1], Notice::PresetFailed(_)));
    assert_eq!(notices[2], Notice::PresetsImported(1));
    assert_eq!(notices[3], Notice::PresetDeleted("a".into()));
    assert!(matches!(notices[4], Notice::PresetFailed(_)));
    assert_eq!(e.presets().len(), 2);
}

#[test]
fn plan_keeps_store_order_and_skips_hidden_layers() {
    let mut e = engine();
    e.push(Command::AddLayer);
    e.push(Command::AddLayer);
    e.push(Command::SetLayerBlend(0, BlendMode::Screen));
    e.push(Command::SetLayerBlend(2, BlendMode::Add));
    e.push(Command::SetParam(ParamId::Layer(1, LayerParam::Opacity), 0.0));
    let plan = e.tick(0.0, &mut Silence);
    let order: Vec<usize> = plan.draws.iter().map(|d| d.layer).collect();
    assert_eq!(order, vec![0, 2]);
    assert_eq!(plan.draws[0].blend, BlendMode::Screen);
    assert_eq!(plan.draws[1].blend, BlendMode::Add);

    e.push(Command::ToggleLayer(2));
    let plan = e.tick(16.0, &mut Silence);
    assert_eq!(plan.draws.len(), 1);
}

#[test]
fn audio_drives_camera_and_hud() {
    let mut e = engine();
    let mut loud = BandEnergies {
        bass: 1.0,
        mid: 0.0,
        high: 0.0,
    };
    let quiet = e.tick(0.0, &mut Silence);
    let hot = e.tick(16.0, &mut loud);
    assert!(hot.zoom < quiet.zoom);
    assert!(hot.hud.glow > quiet.hud.glow);
    assert!(hot.hud.scale > 1.0);
    assert_eq!(quiet.hud.glow, 0.25);
}

#[test]
fn shared_link_round_trips() {
    let mut e = engine();
    e.push(Command::AddLayer);
    e.push(Command::SetLayerTheme(1, ColorTheme::Vaporwave));
    e.tick(0.0, &mut Silence);
    let preset = e.capture_preset("Shared Setup");
    let code = encode_share(&preset).unwrap();
    assert_eq!(decode_share(&code).unwrap(), preset);
    assert!(decode_share("not base64!").is_err());
    assert!(decode_share("aGVsbG8=").is_err());
}
