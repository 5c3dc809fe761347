use crate::audio::AudioPlayer;
use crate::dom;
use crate::keys::{is_text_entry, key_action, KeyAction};
use std::cell::RefCell;
use std::rc::Rc;
use vj_core::{Command, EngineContext};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn handle_global_keydown(
    ev: &web::KeyboardEvent,
    engine: &Rc<RefCell<EngineContext>>,
    player: &AudioPlayer,
) {
    if dom::target_tag(ev).is_some_and(|tag| is_text_entry(&tag)) {
        return;
    }
    let Some(action) = key_action(&ev.code(), ev.ctrl_key() || ev.meta_key()) else {
        return;
    };
    if action.prevents_default() {
        ev.prevent_default();
    }
    let mut eng = engine.borrow_mut();
    match action {
        KeyAction::PlayPause => player.toggle_play(),
        KeyAction::SelectLayer(i) => eng.push(Command::SelectLayer(i)),
        KeyAction::SelectPrev => eng.push(Command::SelectPrev),
        KeyAction::SelectNext => eng.push(Command::SelectNext),
        KeyAction::Duplicate => eng.push(Command::DuplicateSelected),
        KeyAction::MuteSelected => {
            if let Some(i) = eng.layers().selected() {
                eng.push(Command::ToggleLayer(i));
            }
        }
        KeyAction::TapTempo => eng.push(Command::TapTempo(instant::now())),
        KeyAction::ToggleMidiLearn => eng.push(Command::ToggleMidiLearn),
    }
}

pub fn wire_global_keydown(engine: &Rc<RefCell<EngineContext>>, player: &Rc<AudioPlayer>) {
    let Some(window) = web::window() else {
        return;
    };
    let engine = engine.clone();
    let player = player.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &engine, &player);
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}
