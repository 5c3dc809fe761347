// Pure keyboard mapping; no web-sys types so host tests can include it.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    PlayPause,
    /// Zero-based layer index.
    SelectLayer(usize),
    SelectPrev,
    SelectNext,
    Duplicate,
    MuteSelected,
    TapTempo,
    ToggleMidiLearn,
}

impl KeyAction {
    /// Whether the browser's default handling (scrolling) must be suppressed.
    #[inline]
    pub fn prevents_default(self) -> bool {
        matches!(
            self,
            KeyAction::PlayPause | KeyAction::SelectPrev | KeyAction::SelectNext
        )
    }
}

/// Map a `KeyboardEvent.code` to an action. Modified letter keys are left to
/// the browser (copy, paste and friends).
#[inline]
pub fn key_action(code: &str, ctrl_or_meta: bool) -> Option<KeyAction> {
    if let Some(digit) = code.strip_prefix("Digit") {
        return match digit.parse::<usize>() {
            Ok(n @ 1..=9) => Some(KeyAction::SelectLayer(n - 1)),
            _ => None,
        };
    }
    match code {
        "Space" => Some(KeyAction::PlayPause),
        "ArrowUp" => Some(KeyAction::SelectPrev),
        "ArrowDown" => Some(KeyAction::SelectNext),
        "KeyD" if !ctrl_or_meta => Some(KeyAction::Duplicate),
        "KeyM" if !ctrl_or_meta => Some(KeyAction::MuteSelected),
        "KeyT" if !ctrl_or_meta => Some(KeyAction::TapTempo),
        "KeyL" if !ctrl_or_meta => Some(KeyAction::ToggleMidiLearn),
        _ => None,
    }
}

/// Keys typed into form fields never trigger shortcuts.
#[inline]
pub fn is_text_entry(tag_name: &str) -> bool {
    matches!(
        tag_name.to_ascii_uppercase().as_str(),
        "INPUT" | "TEXTAREA" | "SELECT"
    )
}
