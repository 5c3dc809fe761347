use vj_core::{Command, EngineContext, ParamId};
use winit::keyboard::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    ToggleBeatSync,
    SelectLayer(usize),
    SelectPrev,
    SelectNext,
    AddLayer,
    Duplicate,
    MuteSelected,
    TapTempo,
    ToggleMidiLearn,
}

#[inline]
pub fn shortcut_for(code: KeyCode, ctrl_or_super: bool) -> Option<Shortcut> {
    let digit = match code {
        KeyCode::Digit1 => Some(0),
        KeyCode::Digit2 => Some(1),
        KeyCode::Digit3 => Some(2),
        KeyCode::Digit4 => Some(3),
        KeyCode::Digit5 => Some(4),
        KeyCode::Digit6 => Some(5),
        KeyCode::Digit7 => Some(6),
        KeyCode::Digit8 => Some(7),
        KeyCode::Digit9 => Some(8),
        _ => None,
    };
    if let Some(i) = digit {
        return Some(Shortcut::SelectLayer(i));
    }
    if ctrl_or_super {
        return None;
    }
    match code {
        KeyCode::Space => Some(Shortcut::ToggleBeatSync),
        KeyCode::ArrowUp => Some(Shortcut::SelectPrev),
        KeyCode::ArrowDown => Some(Shortcut::SelectNext),
        KeyCode::KeyA => Some(Shortcut::AddLayer),
        KeyCode::KeyD => Some(Shortcut::Duplicate),
        KeyCode::KeyM => Some(Shortcut::MuteSelected),
        KeyCode::KeyT => Some(Shortcut::TapTempo),
        KeyCode::KeyL => Some(Shortcut::ToggleMidiLearn),
        _ => None,
    }
}

/// Resolve a shortcut against current engine state.
pub fn command_for(shortcut: Shortcut, engine: &EngineContext, now_ms: f64) -> Option<Command> {
    Some(match shortcut {
        Shortcut::ToggleBeatSync => {
            let on = engine.controls().beat_sync;
            Command::SetParam(ParamId::BeatSync, if on { 0.0 } else { 1.0 })
        }
        Shortcut::SelectLayer(i) => Command::SelectLayer(i),
        Shortcut::SelectPrev => Command::SelectPrev,
        Shortcut::SelectNext => Command::SelectNext,
        Shortcut::AddLayer => Command::AddLayer,
        Shortcut::Duplicate => Command::DuplicateSelected,
        Shortcut::MuteSelected => Command::ToggleLayer(engine.layers().selected()?),
        Shortcut::TapTempo => Command::TapTempo(now_ms),
        Shortcut::ToggleMidiLearn => Command::ToggleMidiLearn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vj_core::MemoryStorage;

    #[test]
    fn digits_and_letters_map() {
        assert_eq!(
            shortcut_for(KeyCode::Digit3, false),
            Some(Shortcut::SelectLayer(2))
        );
        assert_eq!(shortcut_for(KeyCode::KeyA, false), Some(Shortcut::AddLayer));
        assert_eq!(shortcut_for(KeyCode::KeyA, true), None);
        assert_eq!(shortcut_for(KeyCode::KeyZ, false), None);
    }

    #[test]
    fn space_flips_beat_sync() {
        let mut engine = EngineContext::new(0.0, Box::new(MemoryStorage::default()));
        let cmd = command_for(Shortcut::ToggleBeatSync, &engine, 0.0).unwrap();
        assert_eq!(cmd, Command::SetParam(ParamId::BeatSync, 1.0));
        engine.push(cmd);
        engine.tick(16.0, &mut vj_core::Silence);
        assert!(engine.controls().beat_sync);
        let cmd = command_for(Shortcut::ToggleBeatSync, &engine, 16.0).unwrap();
        assert_eq!(cmd, Command::SetParam(ParamId::BeatSync, 0.0));
    }

    #[test]
    fn mute_targets_the_selected_layer() {
        let engine = EngineContext::new(0.0, Box::new(MemoryStorage::default()));
        assert_eq!(
            command_for(Shortcut::MuteSelected, &engine, 0.0),
            Some(Command::ToggleLayer(0))
        );
    }
}
