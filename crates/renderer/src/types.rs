use aurora::DEFAULT_TIME_STEP;

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Adapter selection hint passed to `wgpu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    #[default]
    Low,
    High,
}

/// Declares how the compositor should treat the swapchain alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceAlpha {
    /// Frames fully cover whatever sits behind the window.
    #[default]
    Opaque,
    /// Frames carry coverage in alpha and are blended by the compositor.
    Transparent,
}

/// GPU knobs that only matter when a surface is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpuOptions {
    pub antialiasing: Antialiasing,
    pub surface_alpha: SurfaceAlpha,
    pub power: GpuPowerPreference,
    /// Present on vertical blank (`Fifo`) instead of as fast as possible.
    pub vsync: bool,
}

/// How the window is placed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Ordinary decorated window of the configured size.
    #[default]
    Windowed,
    /// Borderless fullscreen window kept below every other window, so other
    /// content is stacked on top of the aurora.
    Backdrop,
}

/// Immutable configuration passed to [`crate::Renderer::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    /// Initial inner size in physical pixels (ignored for backdrops).
    pub size: (u32, u32),
    pub title: String,
    pub placement: Placement,
    pub gpu: GpuOptions,
    /// Upper bound on presented frames per second; `None` follows the
    /// present mode.
    pub max_fps: Option<f32>,
    /// Seconds added to the animation clock per painted frame.
    pub time_step: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: (1280, 720),
            title: "Aurora".to_string(),
            placement: Placement::default(),
            gpu: GpuOptions {
                vsync: true,
                ..GpuOptions::default()
            },
            max_fps: None,
            time_step: DEFAULT_TIME_STEP,
        }
    }
}
