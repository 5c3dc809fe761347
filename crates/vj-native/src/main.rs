use std::sync::mpsc;
use std::time::Instant;
use vj_core::{Command, EngineContext};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::WindowBuilder;

mod capture;
mod keys;
mod midi;
mod render;
mod spectrum;
mod storage;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Audio and MIDI callbacks run on their own threads; they reach the
    // engine only through the sample ring and this channel.
    let (tx, rx) = mpsc::channel::<Command>();
    let _midi_connections = midi::connect_inputs(&tx);
    let samples = capture::shared_samples();
    let _input_stream = capture::start_capture(samples.clone());
    let mut audio = capture::CaptureBridge::new(samples);

    let clock = Instant::now();
    let now_ms = move || clock.elapsed().as_secs_f64() * 1000.0;
    let mut engine = EngineContext::new(now_ms(), Box::new(storage::FileStorage::from_env()));

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("VJ engine (native)")
        .build(&event_loop)?;
    let mut gpu = pollster::block_on(render::GpuState::new(&window))?;
    let mut modifier_down = false;

    log::info!("vj-native running; press A to add a layer, Space to toggle beat sync");

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => gpu.resize(size),
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::ModifiersChanged(m) => {
                modifier_down = m.state().control_key() || m.state().super_key();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let cmd = keys::shortcut_for(code, modifier_down)
                    .and_then(|s| keys::command_for(s, &engine, now_ms()));
                if let Some(cmd) = cmd {
                    engine.push(cmd);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            while let Ok(cmd) = rx.try_recv() {
                engine.push(cmd);
            }
            let size = gpu.window.inner_size();
            engine.set_resolution(size.width, size.height);
            let plan = engine.tick(now_ms(), &mut audio);
            for notice in engine.take_notices() {
                log::info!("[notice] {}", notice);
            }
            match gpu.render(&plan) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    gpu.resize(gpu.window.inner_size())
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("[gpu] out of memory");
                    elwt.exit();
                }
                Err(e) => log::warn!("[gpu] frame skipped: {:?}", e),
            }
        }
        _ => {}
    })?;
    Ok(())
}
