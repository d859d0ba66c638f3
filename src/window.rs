//! Desktop viewer: a winit window driving an [`Engine`] over [`GpuBackend`].
//!
//! | Key | Action |
//! |-----|--------|
//! | `1`–`7` | morph to the n-th shape |
//! | `P` | next palette |
//! | `Space` | skill wave from the window center |
//! | `Esc` | quit |

use std::sync::Arc;

use glam::Vec2;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::gpu::GpuBackend;
use crate::shapes::ShapeId;
use crate::time::WallClock;

struct App {
    config: EngineConfig,
    window: Option<Arc<Window>>,
    engine: Option<Engine<GpuBackend>>,
    wall: WallClock,
    failure: Option<EngineError>,
}

impl App {
    fn new(config: EngineConfig) -> Self {
        Self { config, window: None, engine: None, wall: WallClock::new(), failure: None }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EngineError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.name.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| EngineError::RenderBackendUnavailable(e.to_string()))?,
        );
        let backend = pollster::block_on(GpuBackend::new(window.clone()))?;
        let mut engine = Engine::new(self.config.clone(), backend)?;
        engine.on_visibility(true);
        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        self.wall = WallClock::new();
        Ok(())
    }

    fn handle_key(engine: &mut Engine<GpuBackend>, code: KeyCode, event_loop: &ActiveEventLoop) {
        let digit = match code {
            KeyCode::Digit1 => Some(0),
            KeyCode::Digit2 => Some(1),
            KeyCode::Digit3 => Some(2),
            KeyCode::Digit4 => Some(3),
            KeyCode::Digit5 => Some(4),
            KeyCode::Digit6 => Some(5),
            KeyCode::Digit7 => Some(6),
            _ => None,
        };
        if let Some(shape) = digit.and_then(|i| ShapeId::ALL.get(i).copied()) {
            if let Err(err) = engine.request_shape(shape) {
                info!("{}", err);
            }
            return;
        }
        match code {
            KeyCode::KeyP => {
                engine.cycle_palette();
            }
            KeyCode::Space => {
                let viewport = engine.viewport();
                let center = Vec2::new(viewport.width as f32, viewport.height as f32) * 0.5;
                let count = engine.default_wave_count();
                engine.skill_wave(center, count);
            }
            KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.start(event_loop) {
                error!("viewer failed to start: {}", err);
                self.failure = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        if engine.on_window_event(&event) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                engine.backend_mut().resize(physical_size.width, physical_size.height);
                engine.on_resize(physical_size.width, physical_size.height);
            }
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state: ElementState::Pressed, repeat: false, .. },
                ..
            } => Self::handle_key(engine, code, event_loop),
            WindowEvent::RedrawRequested => {
                engine.tick(self.wall.lap());
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Open a window and run `config` until it is closed.
pub fn run(config: EngineConfig) -> Result<(), EngineError> {
    config.validate()?;
    let event_loop = EventLoop::new().map_err(|e| EngineError::RenderBackendUnavailable(e.to_string()))?;
    let mut app = App::new(config);
    if let Err(err) = event_loop.run_app(&mut app) {
        warn!("event loop ended with error: {}", err);
    }
    match app.failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
