//! Lifecycle of the procedural background.
//!
//! ```text
//!   Uninitialized ──mount ok──▶ Running ──teardown──▶ TornDown
//!         │                      │  ▲
//!         │ mount failed         │  └── on_frame / resize
//!         ▼                      │
//!      Degraded ────teardown─────┘──────────────────▶ TornDown
//! ```
//!
//! The renderer owns the clock, the resolution and the surface; nothing else
//! writes them. Each frame callback paints once and schedules the next one, so
//! exactly one request is outstanding while running.

use tracing::{debug, error, info, trace, warn};

use crate::clock::{Clock, DEFAULT_TIME_STEP};
use crate::host::{FrameInputs, FrameRequest, Host, Surface, SurfaceError, Viewport};

/// Where the renderer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Running,
    /// Mount could not obtain a surface; the background stays blank.
    Degraded,
    TornDown,
}

/// Result of delivering one frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was painted and the next one scheduled.
    Painted,
    /// The request was stale or the renderer is not running.
    Ignored,
    /// Painting failed; the next frame is scheduled regardless.
    Dropped,
    /// A fatal surface error tore the renderer down.
    Stopped,
}

pub struct BackgroundRenderer<S: Surface> {
    phase: Phase,
    origin: Clock,
    clock: Clock,
    resolution: Viewport,
    surface: Option<S>,
    pending: Option<FrameRequest>,
    frames_rendered: u64,
}

impl<S: Surface> BackgroundRenderer<S> {
    pub fn new() -> Self {
        Self::with_clock(Clock::new(DEFAULT_TIME_STEP))
    }

    /// Uses `origin` as the clock value installed on mount.
    pub fn with_clock(origin: Clock) -> Self {
        Self {
            phase: Phase::Uninitialized,
            origin,
            clock: origin,
            resolution: Viewport::new(0, 0),
            surface: None,
            pending: None,
            frames_rendered: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn resolution(&self) -> Viewport {
        self.resolution
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn pending_request(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Attaches a surface sized to the host viewport and starts the loop.
    ///
    /// Failing to obtain a surface is not an error for the caller: the
    /// renderer logs it and stays [`Phase::Degraded`].
    pub fn mount<H>(&mut self, host: &mut H) -> Phase
    where
        H: Host<Surface = S>,
    {
        if self.phase != Phase::Uninitialized {
            debug!(phase = ?self.phase, "mount ignored; renderer already mounted");
            return self.phase;
        }

        let viewport = host.viewport();
        if viewport.is_empty() {
            warn!(%viewport, "viewport has no area; background disabled");
            self.phase = Phase::Degraded;
            return self.phase;
        }

        match host.acquire_surface(viewport) {
            Ok(surface) => {
                self.surface = Some(surface);
                self.clock = self.origin;
                self.resolution = viewport;
                self.pending = Some(host.request_frame());
                self.phase = Phase::Running;
                info!(
                    %viewport,
                    time = self.clock.seconds(),
                    step = self.clock.step(),
                    "background mounted"
                );
            }
            Err(err) => {
                warn!(error = %err, "background unavailable; continuing without it");
                self.phase = Phase::Degraded;
            }
        }
        self.phase
    }

    /// Frame callback: advance the clock, paint, schedule the next frame.
    pub fn on_frame<H>(&mut self, host: &mut H, request: FrameRequest) -> TickOutcome
    where
        H: Host<Surface = S>,
    {
        if self.phase != Phase::Running || self.pending != Some(request) {
            trace!(request = request.id(), phase = ?self.phase, "ignoring stale frame request");
            return TickOutcome::Ignored;
        }
        self.pending = None;

        self.clock.advance();
        let inputs = FrameInputs {
            time: self.clock.uniform(),
            resolution: self.resolution.resolution(),
            tick: self.clock.ticks(),
        };

        let Some(surface) = self.surface.as_mut() else {
            return TickOutcome::Ignored;
        };
        let result = surface.render(&inputs);

        let outcome = match result {
            Ok(()) => {
                self.frames_rendered += 1;
                TickOutcome::Painted
            }
            Err(SurfaceError::Lost) => {
                debug!(resolution = %self.resolution, "surface lost; reconfiguring");
                if let Some(surface) = self.surface.as_mut() {
                    surface.resize(self.resolution);
                }
                TickOutcome::Dropped
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("surface out of memory; stopping background");
                self.teardown(host);
                return TickOutcome::Stopped;
            }
            Err(err) => {
                warn!(error = %err, tick = inputs.tick, "frame failed; retrying next frame");
                TickOutcome::Dropped
            }
        };

        self.pending = Some(host.request_frame());
        outcome
    }

    /// Applies a new viewport. The pending frame request is left untouched.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.phase != Phase::Running {
            trace!(%viewport, phase = ?self.phase, "resize ignored");
            return;
        }
        if viewport.is_empty() {
            debug!(%viewport, "ignoring resize to an empty viewport");
            return;
        }
        if viewport == self.resolution {
            return;
        }

        if let Some(surface) = self.surface.as_mut() {
            surface.resize(viewport);
        }
        debug!(from = %self.resolution, to = %viewport, "background resized");
        self.resolution = viewport;
    }

    /// Stops the loop and releases the surface. Safe to call in any phase and
    /// any number of times.
    pub fn teardown<H>(&mut self, host: &mut H)
    where
        H: Host<Surface = S>,
    {
        if let Some(request) = self.pending.take() {
            host.cancel_frame(request);
        }
        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
        if self.phase != Phase::TornDown {
            info!(
                frames = self.frames_rendered,
                time = self.clock.seconds(),
                "background torn down"
            );
        }
        self.phase = Phase::TornDown;
    }
}

impl<S: Surface> Default for BackgroundRenderer<S> {
    fn default() -> Self {
        Self::new()
    }
}
