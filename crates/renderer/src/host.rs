//! `aurora::Host` on top of a `winit` window.

use std::sync::Arc;

use aurora::{FrameInputs, FrameRequest, Host, HostError, Surface, SurfaceError, Viewport};
use tracing::debug;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::gpu::GpuState;
use crate::types::GpuOptions;

/// Drawing surface backed by the window's swapchain.
pub struct GpuSurface {
    gpu: Option<GpuState>,
}

impl GpuSurface {
    fn new(gpu: GpuState) -> Self {
        Self { gpu: Some(gpu) }
    }
}

impl Surface for GpuSurface {
    fn size(&self) -> Viewport {
        self.gpu
            .as_ref()
            .map(|gpu| Viewport::new(gpu.size().width, gpu.size().height))
            .unwrap_or(Viewport::new(0, 0))
    }

    fn resize(&mut self, viewport: Viewport) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(PhysicalSize::new(viewport.width, viewport.height));
        }
    }

    fn render(&mut self, inputs: &FrameInputs) -> Result<(), SurfaceError> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Err(SurfaceError::Lost);
        };
        match gpu.render(inputs) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                Err(SurfaceError::Lost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(SurfaceError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout) => Err(SurfaceError::Timeout),
            Err(other) => Err(SurfaceError::Other(format!("{other:?}"))),
        }
    }

    fn release(&mut self) {
        if self.gpu.take().is_some() {
            debug!("released GPU surface");
        }
    }
}

/// Window-backed host.
///
/// Frame requests are recorded here and turned into `request_redraw` calls by
/// the event loop, which is also where an FPS cap is applied.
pub struct WindowHost {
    window: Arc<Window>,
    options: GpuOptions,
    next_request: u64,
    pending: Option<FrameRequest>,
}

impl WindowHost {
    pub fn new(window: Arc<Window>, options: GpuOptions) -> Self {
        Self {
            window,
            options,
            next_request: 1,
            pending: None,
        }
    }

    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn take_pending(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl Host for WindowHost {
    type Surface = GpuSurface;

    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width, size.height)
    }

    fn acquire_surface(&mut self, viewport: Viewport) -> Result<GpuSurface, HostError> {
        let size = PhysicalSize::new(viewport.width, viewport.height);
        GpuState::new(Arc::clone(&self.window), size, self.options)
            .map(GpuSurface::new)
            .map_err(|err| HostError::ContextUnavailable(format!("{err:#}")))
    }

    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest::new(self.next_request);
        self.next_request += 1;
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}
