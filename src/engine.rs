//! Engine Core Module
//!
//! [`Engine`] bundles the renderer with frame timing and input state. It has
//! no window management of its own, so it can be driven by the winit runner
//! in [`crate::app`] or by tests that never touch a GPU.
//!
//! Scene and asset ownership stays with the application: the engine only
//! borrows them for [`Engine::render_scene`].
//!
//! # Example
//!
//! ```rust,ignore
//! use robot_stage::{Engine, RendererSettings};
//!
//! let mut engine = Engine::new(RendererSettings::default());
//! engine.init(window, 1280, 720).await?;
//!
//! loop {
//!     engine.update(dt);
//!     engine.render_scene(&scene, &assets);
//! }
//! ```

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::assets::AssetServer;
use crate::render::{Renderer, RendererSettings};
use crate::resources::input::Input;
use crate::scene::Scene;

/// The core engine instance: renderer, input and frame clock.
///
/// # Lifecycle
///
/// 1. Create with [`Engine::new`] or [`Engine::default`]
/// 2. Initialize GPU with [`Engine::init`]
/// 3. Advance each frame with [`Engine::update`]
/// 4. Draw with [`Engine::render_scene`]
pub struct Engine {
    pub renderer: Renderer,
    pub input: Input,

    time: f32,
    frame_count: u64,
}

impl Engine {
    /// GPU resources are not allocated until [`init`](Self::init) is called.
    #[must_use]
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            renderer: Renderer::new(settings),
            input: Input::new(),
            time: 0.0,
            frame_count: 0,
        }
    }

    /// Initializes GPU resources with the given window.
    ///
    /// # Errors
    ///
    /// Returns an error if GPU initialization fails due to:
    /// - No compatible GPU adapter found
    /// - Device request failed
    /// - Surface creation or configuration failed
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> crate::errors::Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        self.renderer.init(window, width, height).await?;
        self.input.inject_resize(width, height);
        Ok(())
    }

    /// Total elapsed time in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Resizes the surface and records the new size for input mapping.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.input.inject_resize(width, height);
    }

    /// Advances the clock and clears per-frame input deltas.
    ///
    /// Call once per frame after the application has consumed this frame's
    /// input.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.frame_count += 1;
        self.input.start_frame();
    }

    /// Draws `scene` from its active camera.
    pub fn render_scene(&mut self, scene: &Scene, assets: &AssetServer) {
        self.renderer.render(scene, assets);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RendererSettings::default())
    }
}

/// Per-frame timing information handed to application callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameState {
    /// Total elapsed time since the application started (in seconds).
    pub time: f32,
    /// Delta time since the last frame (in seconds).
    pub dt: f32,
    /// Total number of frames rendered since startup.
    pub frame_count: u64,
}
