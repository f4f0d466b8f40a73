//! Seams between the background renderer and the environment hosting it.
//!
//! A [`Host`] plays the part of the page: it knows the viewport, attaches a
//! drawing [`Surface`] to its container, and owns the "call me on the next
//! frame" primitive. Implementations exist for a `winit` window (GPU) and for
//! the deterministic [`crate::headless`] host (CPU).

use std::fmt;

/// Viewport size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A viewport with a zero dimension cannot back a drawing surface.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// The resolution uniform derived from this viewport.
    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Everything a surface needs to paint one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    /// Clock value in seconds.
    pub time: f32,
    /// Resolution uniform (`width`, `height`).
    pub resolution: [f32; 2],
    /// Number of ticks the clock has taken so far.
    pub tick: u64,
}

/// Handle for one scheduled next-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(u64);

impl FrameRequest {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Failure to set up drawing at mount time.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("host cannot provide a drawing surface: {0}")]
    SurfaceUnavailable(String),
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
}

/// Failure while presenting a single frame.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface lost or outdated")]
    Lost,
    #[error("surface out of memory")]
    OutOfMemory,
    #[error("timed out acquiring the next surface image")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

/// A drawing surface attached to a host container.
pub trait Surface {
    /// Current size in device pixels.
    fn size(&self) -> Viewport;

    /// Reallocates the surface for a new viewport.
    fn resize(&mut self, viewport: Viewport);

    /// Paints and presents one frame.
    fn render(&mut self, inputs: &FrameInputs) -> Result<(), SurfaceError>;

    /// Detaches the surface and frees its resources. Calling it more than once
    /// must be harmless.
    fn release(&mut self);
}

/// Environment hosting a background renderer.
pub trait Host {
    type Surface: Surface;

    /// Current viewport dimensions.
    fn viewport(&self) -> Viewport;

    /// Creates a surface sized to `viewport` and attaches it to the container.
    fn acquire_surface(&mut self, viewport: Viewport) -> Result<Self::Surface, HostError>;

    /// Schedules one invocation of the frame callback.
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancels a previously scheduled callback. Unknown or already fired
    /// requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_viewports_are_detected() {
        assert!(Viewport::new(0, 600).is_empty());
        assert!(Viewport::new(800, 0).is_empty());
        assert!(!Viewport::new(1, 1).is_empty());
    }

    #[test]
    fn resolution_mirrors_dimensions() {
        let viewport = Viewport::new(1024, 768);
        assert_eq!(viewport.resolution(), [1024.0, 768.0]);
        assert_eq!(viewport.pixel_count(), 1024 * 768);
        assert_eq!(viewport.to_string(), "1024x768");
    }
}
