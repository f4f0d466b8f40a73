//! GPU host for the aurora backdrop.
//!
//! The crate puts [`aurora::BackgroundRenderer`] inside a `winit` window and
//! paints it with `wgpu`. The overall flow is:
//!
//! ```text
//!   CLI / backdrop
//!          │ WindowConfig
//!          ▼
//!   Renderer::run ──▶ WindowHost ──▶ winit event loop ──▶ on_frame()
//!          ▲                                      │
//!          │                                      └─▶ GpuState::render() ─▶ GPU UBO
//! ```
//!
//! `WindowHost` implements [`aurora::Host`]: acquiring a surface builds the
//! whole GPU stack (surface, device, pipeline, uniforms), and a GPU that cannot
//! be initialised degrades the renderer instead of failing the window. The
//! fragment shader is a GLSL port of [`aurora::field::shade`] compiled through
//! naga.

mod compile;
mod gpu;
mod host;
mod types;
mod window;

use anyhow::Result;

pub use host::{GpuSurface, WindowHost};
pub use types::{Antialiasing, GpuOptions, GpuPowerPreference, Placement, SurfaceAlpha, WindowConfig};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: WindowConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Opens the window and animates until it is closed.
    ///
    /// Returns an error only when no window can be created at all (for
    /// example without a display server). GPU failures after that point leave
    /// the window open and blank.
    pub fn run(self) -> Result<()> {
        tracing::info!(
            size = ?self.config.size,
            placement = ?self.config.placement,
            max_fps = ?self.config.max_fps,
            time_step = self.config.time_step,
            "starting aurora window"
        );
        window::run_window(self.config)
    }
}
