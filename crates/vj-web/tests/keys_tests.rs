// Host-side tests for pure keyboard functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod keys {
    include!("../src/keys.rs");
}

use keys::*;

#[test]
fn digits_select_zero_based_layers() {
    assert_eq!(key_action("Digit1", false), Some(KeyAction::SelectLayer(0)));
    assert_eq!(key_action("Digit9", false), Some(KeyAction::SelectLayer(8)));
    assert_eq!(key_action("Digit0", false), None);
}

#[test]
fn letter_shortcuts_respect_modifiers() {
    assert_eq!(key_action("KeyD", false), Some(KeyAction::Duplicate));
    assert_eq!(key_action("KeyM", false), Some(KeyAction::MuteSelected));
    assert_eq!(key_action("KeyT", false), Some(KeyAction::TapTempo));
    assert_eq!(key_action("KeyL", false), Some(KeyAction::ToggleMidiLearn));
    assert_eq!(key_action("KeyD", true), None);
    assert_eq!(key_action("KeyX", false), None);
}

#[test]
fn navigation_keys_suppress_scrolling() {
    for code in ["Space", "ArrowUp", "ArrowDown"] {
        let action = key_action(code, false).unwrap();
        assert!(action.prevents_default(), "{}", code);
    }
    assert!(!KeyAction::Duplicate.prevents_default());
}

#[test]
fn form_fields_swallow_shortcuts() {
    assert!(is_text_entry("INPUT"));
    assert!(is_text_entry("textarea"));
    assert!(is_text_entry("SELECT"));
    assert!(!is_text_entry("CANVAS"));
    assert!(!is_text_entry("BODY"));
}
