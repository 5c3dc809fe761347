#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use vj_core::EngineContext;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod dom;
mod events;
mod frame;
mod handle;
mod hud;
mod keys;
mod midi;
mod render;
mod share;
mod storage;
mod ui;

pub use handle::VjHandle;

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("vj-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas_el = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    wire_canvas_resize(&canvas);

    static STARTED: AtomicBool = AtomicBool::new(false);
    if STARTED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let engine = Rc::new(RefCell::new(EngineContext::new(
        instant::now(),
        Box::new(storage::LocalStorage::open()),
    )));
    handle::apply_shared_preset(&window, &engine);

    let player = Rc::new(audio::AudioPlayer::new(&document)?);
    let bridge = audio::AnalyserBridge::new(&player);
    audio::wire_controls(&document, &player);

    events::wire_global_keydown(&engine, &player);
    spawn_local(midi::connect(engine.clone()));

    // A surface failure is fatal: no degraded mode without a compositor.
    let gpu = frame::init_gpu(&canvas)
        .await
        .ok_or_else(|| anyhow::anyhow!("WebGPU unavailable"))?;

    handle::publish(VjHandle::new(engine.clone(), player.clone()));

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        engine,
        audio: bridge,
        gpu: Some(gpu),
        canvas,
        document,
        overlay: ui::Overlay::default(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
