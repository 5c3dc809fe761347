use std::cell::RefCell;
use std::rc::Rc;
use vj_core::{Command, EngineContext};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Request Web MIDI access and forward every input's messages to the engine
/// as raw `Command::Midi` bytes. Denied access is logged; the engine runs on.
pub async fn connect(engine: Rc<RefCell<EngineContext>>) {
    let Some(window) = web::window() else {
        return;
    };
    let promise = match window.navigator().request_midi_access() {
        Ok(p) => p,
        Err(e) => {
            log::warn!("[midi] Web MIDI not supported: {:?}", e);
            return;
        }
    };
    let access: web::MidiAccess = match JsFuture::from(promise).await {
        Ok(a) => a.unchecked_into(),
        Err(e) => {
            log::warn!("[midi] access denied: {:?}", e);
            return;
        }
    };

    let on_message = Closure::wrap(Box::new(move |ev: web::Event| {
        if let Some(bytes) = message_bytes(&ev) {
            engine.borrow_mut().push(Command::Midi(bytes));
        }
    }) as Box<dyn FnMut(_)>);
    let on_message = Rc::new(on_message);

    bind_inputs(&access, &on_message);

    // Re-bind on hot-plug so newly attached controllers are picked up.
    let access_for_state = access.clone();
    let on_state = Closure::wrap(Box::new(move |_ev: web::Event| {
        bind_inputs(&access_for_state, &on_message);
    }) as Box<dyn FnMut(_)>);
    access.set_onstatechange(Some(on_state.as_ref().unchecked_ref()));
    on_state.forget();
}

fn bind_inputs(access: &web::MidiAccess, on_message: &Closure<dyn FnMut(web::Event)>) {
    let inputs: js_sys::Map = access.inputs().unchecked_into();
    let mut count = 0;
    inputs.for_each(&mut |value, _key| {
        if let Ok(input) = value.dyn_into::<web::MidiInput>() {
            input.set_onmidimessage(Some(on_message.as_ref().unchecked_ref()));
            count += 1;
        }
    });
    log::info!("[midi] {} input(s) connected", count);
}

fn message_bytes(ev: &web::Event) -> Option<Vec<u8>> {
    let data = js_sys::Reflect::get(ev, &JsValue::from_str("data")).ok()?;
    if data.is_null() || data.is_undefined() {
        return None;
    }
    Some(js_sys::Uint8Array::new(&data).to_vec())
}
