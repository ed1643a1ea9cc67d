//! Renderer Settings
//!
//! ```rust,ignore
//! use robot_stage::render::RendererSettings;
//!
//! let settings = RendererSettings {
//!     vsync: false,
//!     ..Default::default()
//! };
//!
//! App::new()
//!     .with_settings(settings)
//!     .run::<MyApp>()?;
//! ```

/// Configuration applied when the GPU context is created.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Cap the frame rate to the display refresh rate.
    pub vsync: bool,

    /// GPU adapter selection preference.
    ///
    /// - `HighPerformance`: Prefer discrete / dedicated GPU
    /// - `LowPower`: Prefer integrated GPU (better battery life)
    pub power_preference: wgpu::PowerPreference,

    /// Background clear color for the main render target.
    pub clear_color: wgpu::Color,

    /// Depth buffer texture format.
    pub depth_format: wgpu::TextureFormat,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}

impl RendererSettings {
    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    #[must_use]
    pub fn with_clear_color(mut self, clear_color: wgpu::Color) -> Self {
        self.clear_color = clear_color;
        self
    }

    #[must_use]
    pub fn with_power_preference(mut self, power_preference: wgpu::PowerPreference) -> Self {
        self.power_preference = power_preference;
        self
    }
}
