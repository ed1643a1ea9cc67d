//! Winit-based Application Framework
//!
//! A thin runner on top of [winit](https://crates.io/crates/winit):
//!
//! - [`App`]: builder for the window title and renderer settings
//! - [`AppHandler`]: trait the application implements
//! - `AppRunner`: the winit [`ApplicationHandler`] driving both
//!
//! The runner owns the window and the [`Engine`]; the handler owns its scene
//! and assets and decides what to draw in [`AppHandler::render`].
//!
//! # Example
//!
//! ```rust,ignore
//! use robot_stage::app::{App, AppHandler};
//! use robot_stage::engine::{Engine, FrameState};
//! use std::sync::Arc;
//! use winit::window::Window;
//!
//! struct Viewer { /* scene, assets */ }
//!
//! impl AppHandler for Viewer {
//!     fn init(engine: &mut Engine, window: &Arc<Window>) -> Self {
//!         Viewer { /* ... */ }
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {}
//!
//!     fn render(&mut self, engine: &mut Engine) {
//!         engine.render_scene(&self.scene, &self.assets);
//!     }
//! }
//!
//! fn main() -> robot_stage::errors::Result<()> {
//!     App::new().with_title("Viewer").run::<Viewer>()
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::engine::{Engine, FrameState};
use crate::render::RendererSettings;

pub mod input_adapter;

/// Trait for defining application behavior.
///
/// # Lifecycle
///
/// 1. [`init`](Self::init) - once, after the window and GPU exist
/// 2. [`on_event`](Self::on_event) - for each window event
/// 3. [`update`](Self::update) - each frame before rendering
/// 4. [`render`](Self::render) - each frame after updating
pub trait AppHandler: Sized + 'static {
    /// Builds the application state. The renderer is already initialized.
    fn init(engine: &mut Engine, window: &Arc<Window>) -> Self;

    /// Called for each window event before the engine sees it.
    ///
    /// Return `true` to consume the event. Resize and redraw are still
    /// handled by the runner; consumed events just don't reach
    /// [`Engine::input`].
    #[allow(unused_variables)]
    fn on_event(&mut self, engine: &mut Engine, window: &Arc<Window>, event: &WindowEvent) -> bool {
        false
    }

    /// Advances application state by one frame.
    ///
    /// This frame's input is still readable from `engine.input`; it is
    /// cleared right after this call returns.
    #[allow(unused_variables)]
    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {}

    /// Draws the frame, usually through [`Engine::render_scene`].
    fn render(&mut self, engine: &mut Engine);
}

/// Application builder.
///
/// ```rust,ignore
/// App::new()
///     .with_title("Robot Stage")
///     .with_settings(RendererSettings::default().with_vsync(false))
///     .run::<MyHandler>()?;
/// ```
pub struct App {
    title: String,
    render_settings: RendererSettings,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Robot Stage".into(),
            render_settings: RendererSettings::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RendererSettings) -> Self {
        self.render_settings = settings;
        self
    }

    /// Runs the application with the specified handler.
    ///
    /// Blocks until the window is closed; the event loop takes ownership of
    /// the current thread.
    ///
    /// # Errors
    ///
    /// Returns an error if event loop creation or execution fails.
    pub fn run<H: AppHandler>(self) -> crate::errors::Result<()> {
        use crate::Error;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::<H>::new(self.title, self.render_settings);
        event_loop.run_app(&mut runner).map_err(Error::from)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct AppRunner<H: AppHandler> {
    title: String,
    render_settings: RendererSettings,

    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    user_state: Option<H>,

    start_time: Instant,
    last_loop_time: Instant,
}

impl<H: AppHandler> AppRunner<H> {
    fn new(title: String, render_settings: RendererSettings) -> Self {
        let now = Instant::now();
        Self {
            title,
            render_settings,
            window: None,
            engine: None,
            user_state: None,
            start_time: now,
            last_loop_time: now,
        }
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> crate::errors::Result<Arc<Window>> {
        let window_attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        Ok(Arc::new(event_loop.create_window(window_attributes)?))
    }

    fn update_logic(&mut self) {
        let now = Instant::now();
        let total_time = now.duration_since(self.start_time).as_secs_f32();
        let dt = now.duration_since(self.last_loop_time).as_secs_f32();
        self.last_loop_time = now;

        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        let frame_state = FrameState {
            time: total_time,
            dt,
            frame_count: engine.frame_count(),
        };

        user_state.update(engine, window, &frame_state);
        engine.update(dt);
    }

    fn render_frame(&mut self) {
        if let (Some(engine), Some(user_state)) = (&mut self.engine, &mut self.user_state) {
            user_state.render(engine);
        }
    }
}

impl<H: AppHandler> ApplicationHandler for AppRunner<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        log::info!("Initializing Renderer Backend...");

        let mut engine = Engine::new(self.render_settings.clone());
        let size = window.inner_size();

        if let Err(e) = pollster::block_on(engine.init(window.clone(), size.width, size.height)) {
            log::error!("Fatal Renderer Error: {e}");
            event_loop.exit();
            return;
        }

        self.user_state = Some(H::init(&mut engine, &window));
        self.engine = Some(engine);

        let now = Instant::now();
        self.start_time = now;
        self.last_loop_time = now;
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        let consumed = user_state.on_event(engine, window, &event);
        if !consumed {
            input_adapter::process_window_event(&mut engine.input, &event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(physical_size) => {
                engine.resize(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => {
                self.update_logic();
                self.render_frame();
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.engine.is_some()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}
