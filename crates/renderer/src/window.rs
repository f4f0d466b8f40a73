use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use aurora::{BackgroundRenderer, Clock, Phase, TickOutcome, Viewport};
use tracing::{error, info, trace};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, WindowBuilder, WindowLevel};

use crate::host::WindowHost;
use crate::types::{Placement, SurfaceAlpha, WindowConfig};

/// Spaces presented frames at least `1 / max_fps` apart.
#[derive(Debug, Clone)]
pub(crate) struct FramePacer {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FramePacer {
    pub(crate) fn new(max_fps: Option<f32>) -> Self {
        let interval = max_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            last_frame: None,
        }
    }

    pub(crate) fn ready(&self, now: Instant) -> bool {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        Some(self.last_frame? + self.interval?)
    }

    pub(crate) fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }
}

fn window_builder(config: &WindowConfig) -> WindowBuilder {
    let mut builder = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.size.0, config.size.1))
        .with_transparent(config.gpu.surface_alpha == SurfaceAlpha::Transparent);
    if config.placement == Placement::Backdrop {
        builder = builder
            .with_decorations(false)
            .with_window_level(WindowLevel::AlwaysOnBottom)
            .with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    builder
}

fn is_escape(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && !event.repeat
        && matches!(event.logical_key, Key::Named(NamedKey::Escape))
}

pub(crate) fn run_window(config: WindowConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window = window_builder(&config)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;

    let mut host = WindowHost::new(Arc::new(window), config.gpu);
    let mut renderer = BackgroundRenderer::with_clock(Clock::new(config.time_step));
    let mut pacer = FramePacer::new(config.max_fps);

    if renderer.mount(&mut host) == Phase::Degraded {
        info!("aurora unavailable; keeping an empty window open");
    }

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == host.window().id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                renderer.teardown(&mut host);
                elwt.exit();
            }
            WindowEvent::KeyboardInput { event, .. } if is_escape(&event) => {
                renderer.teardown(&mut host);
                elwt.exit();
            }
            WindowEvent::Resized(size) => {
                renderer.resize(Viewport::new(size.width, size.height));
            }
            WindowEvent::RedrawRequested => {
                // Expose events also redraw; only scheduled frames advance the clock.
                let Some(request) = host.take_pending() else {
                    return;
                };
                pacer.mark_rendered(Instant::now());
                if renderer.on_frame(&mut host, request) == TickOutcome::Stopped {
                    error!("surface out of memory; closing window");
                    elwt.exit();
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            if host.pending().is_none() {
                elwt.set_control_flow(ControlFlow::Wait);
                return;
            }
            let now = Instant::now();
            if pacer.ready(now) {
                host.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = pacer.next_deadline() {
                trace!(
                    wait_ms = deadline.saturating_duration_since(now).as_millis(),
                    "pacer: waiting for next frame slot"
                );
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
        }
        Event::LoopExiting => {
            renderer.teardown(&mut host);
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
