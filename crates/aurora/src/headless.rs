//! Deterministic host for running the background without a window system.
//!
//! Frame requests are plain counters: the caller plays the part of the
//! presentation loop by taking the pending request and handing it back to the
//! renderer. Used by the still/sequence exporters and by tests.

use tracing::{debug, trace};

use crate::background::{BackgroundRenderer, TickOutcome};
use crate::host::{FrameRequest, Host, HostError, Viewport};
use crate::raster::{CpuSurface, FrameSink};

pub struct HeadlessHost<F> {
    viewport: Viewport,
    make_sink: F,
    next_request: u64,
    pending: Option<FrameRequest>,
    requests_issued: u64,
    cancellations: u64,
    surfaces_acquired: u64,
    unavailable: Option<String>,
}

impl<F, S> HeadlessHost<F>
where
    F: FnMut() -> S,
    S: FrameSink,
{
    /// Creates a host whose surfaces forward frames to sinks built by
    /// `make_sink`.
    pub fn new(viewport: Viewport, make_sink: F) -> Self {
        Self {
            viewport,
            make_sink,
            next_request: 1,
            pending: None,
            requests_issued: 0,
            cancellations: 0,
            surfaces_acquired: 0,
            unavailable: None,
        }
    }

    /// Makes every surface acquisition fail with `reason`.
    pub fn without_surface(mut self, reason: impl Into<String>) -> Self {
        self.unavailable = Some(reason.into());
        self
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Removes and returns the scheduled request, as a presentation callback
    /// firing would.
    pub fn take_pending(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// True when no frame callback is scheduled.
    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    pub fn cancellations(&self) -> u64 {
        self.cancellations
    }

    pub fn surfaces_acquired(&self) -> u64 {
        self.surfaces_acquired
    }
}

impl<F, S> Host for HeadlessHost<F>
where
    F: FnMut() -> S,
    S: FrameSink,
{
    type Surface = CpuSurface<S>;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn acquire_surface(&mut self, viewport: Viewport) -> Result<CpuSurface<S>, HostError> {
        if let Some(reason) = &self.unavailable {
            return Err(HostError::SurfaceUnavailable(reason.clone()));
        }
        self.surfaces_acquired += 1;
        debug!(%viewport, "allocating headless surface");
        Ok(CpuSurface::new(viewport, (self.make_sink)()))
    }

    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest::new(self.next_request);
        self.next_request += 1;
        self.requests_issued += 1;
        if let Some(previous) = self.pending.replace(request) {
            trace!(previous = previous.id(), "replacing unfired frame request");
        }
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.cancellations += 1;
        }
    }
}

/// Fires up to `frames` scheduled callbacks and returns how many painted.
///
/// Stops early when nothing is scheduled, which happens once the renderer has
/// been torn down or never mounted.
pub fn drive<F, S>(
    renderer: &mut BackgroundRenderer<CpuSurface<S>>,
    host: &mut HeadlessHost<F>,
    frames: usize,
) -> usize
where
    F: FnMut() -> S,
    S: FrameSink,
{
    let mut painted = 0;
    for _ in 0..frames {
        let Some(request) = host.take_pending() else {
            break;
        };
        match renderer.on_frame(host, request) {
            TickOutcome::Painted => painted += 1,
            TickOutcome::Stopped => break,
            TickOutcome::Ignored | TickOutcome::Dropped => {}
        }
    }
    painted
}
