//! Core of the aurora backdrop.
//!
//! The crate owns everything that does not depend on a particular display
//! technology: the per-pixel colour function, the animation clock, the seams a
//! host environment plugs into, and the lifecycle state machine that ties them
//! together. The overall flow is:
//!
//! ```text
//!   Host (window / headless)
//!          │ mount()
//!          ▼
//!   BackgroundRenderer ──▶ Surface::render(FrameInputs) ──▶ pixels
//!          ▲                        │
//!          │ on_frame(request)      └─▶ field::shade() per pixel (CPU)
//!          └──── Host::request_frame() ◀──┘     or the GLSL port (GPU)
//! ```
//!
//! `BackgroundRenderer` never talks to a window system directly. A [`Host`]
//! hands out surfaces and next-frame requests; the renderer advances its
//! [`Clock`] once per request and asks the surface to paint. The `renderer`
//! crate implements the host on top of `winit`/`wgpu`, while [`headless`]
//! provides a deterministic host that rasterizes on the CPU.

pub mod background;
pub mod clock;
pub mod field;
pub mod headless;
pub mod host;
pub mod raster;

pub use background::{BackgroundRenderer, Phase, TickOutcome};
pub use clock::{Clock, DEFAULT_TIME_STEP};
pub use headless::{drive, HeadlessHost};
pub use host::{FrameInputs, FrameRequest, Host, HostError, Surface, SurfaceError, Viewport};
pub use raster::{CpuSurface, Frame, FrameSink, SinkError};
