use crate::audio::AnalyserBridge;
use crate::render;
use crate::ui::Overlay;
use std::cell::RefCell;
use std::rc::Rc;
use vj_core::EngineContext;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub engine: Rc<RefCell<EngineContext>>,
    pub audio: AnalyserBridge,
    pub gpu: Option<render::GpuState<'a>>,
    pub canvas: web::HtmlCanvasElement,
    pub document: web::Document,
    pub overlay: Overlay,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now_ms = instant::now();
        let w = self.canvas.width();
        let h = self.canvas.height();

        let (plan, notices, logo) = {
            let mut eng = self.engine.borrow_mut();
            eng.set_resolution(w, h);
            let plan = eng.tick(now_ms, &mut self.audio);
            (plan, eng.take_notices(), eng.controls().logo.clone())
        };

        if !notices.is_empty() {
            self.overlay.show_notices(&self.document, &notices);
        }
        self.overlay.update(&self.document, &plan, &logo);

        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(w, h);
            match g.render(&plan) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("[gpu] surface lost; reconfiguring");
                    g.reconfigure();
                }
                Err(e) => log::error!("render error: {:?}", e),
            }
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
