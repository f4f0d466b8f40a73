//! CPU evaluation of the colour function.
//!
//! [`paint`] walks every pixel of a [`Frame`] and calls [`field::shade`] with
//! the pixel centre, the same way a fragment shader would be invoked once per
//! fragment. Nothing is cached between frames.

use tracing::trace;

use crate::field;
use crate::host::{FrameInputs, Surface, SurfaceError, Viewport};

const CHANNELS: usize = 4;

/// Row-major RGBA8 image, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    viewport: Viewport,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pixels: vec![0; viewport.pixel_count() * CHANNELS],
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn width(&self) -> u32 {
        self.viewport.width
    }

    pub fn height(&self) -> u32 {
        self.viewport.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at column `x`, row `y` (row 0 is the top).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }
        let offset = (y as usize * self.viewport.width as usize + x as usize) * CHANNELS;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + CHANNELS]);
        Some(rgba)
    }
}

/// Shades every pixel of `frame` for the given inputs.
pub fn paint(frame: &mut Frame, inputs: &FrameInputs) {
    if frame.viewport.is_empty() {
        return;
    }
    let width = frame.viewport.width as usize;
    let height = frame.viewport.height;

    for (row, line) in frame.pixels.chunks_exact_mut(width * CHANNELS).enumerate() {
        // Shader coordinates grow upwards from the bottom-left corner.
        let frag_y = (height - 1 - row as u32) as f32 + 0.5;
        for (column, pixel) in line.chunks_exact_mut(CHANNELS).enumerate() {
            let color = field::shade(
                [column as f32 + 0.5, frag_y],
                inputs.time,
                inputs.resolution,
            );
            pixel.copy_from_slice(&field::to_rgba8(color));
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write frame: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode frame: {0}")]
    Encode(String),
}

/// Destination for frames painted by a [`CpuSurface`].
pub trait FrameSink {
    fn consume(&mut self, frame: &Frame, inputs: &FrameInputs) -> Result<(), SinkError>;
}

impl<F> FrameSink for F
where
    F: FnMut(&Frame, &FrameInputs) -> Result<(), SinkError>,
{
    fn consume(&mut self, frame: &Frame, inputs: &FrameInputs) -> Result<(), SinkError> {
        self(frame, inputs)
    }
}

/// Surface that paints into memory and forwards each finished frame.
pub struct CpuSurface<S> {
    frame: Frame,
    sink: S,
    released: bool,
}

impl<S: FrameSink> CpuSurface<S> {
    pub fn new(viewport: Viewport, sink: S) -> Self {
        Self {
            frame: Frame::new(viewport),
            sink,
            released: false,
        }
    }

    /// Most recently painted frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: FrameSink> Surface for CpuSurface<S> {
    fn size(&self) -> Viewport {
        self.frame.viewport()
    }

    fn resize(&mut self, viewport: Viewport) {
        if self.released || viewport == self.frame.viewport() {
            return;
        }
        trace!(from = %self.frame.viewport(), to = %viewport, "reallocating cpu frame");
        self.frame = Frame::new(viewport);
    }

    fn render(&mut self, inputs: &FrameInputs) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Lost);
        }
        paint(&mut self.frame, inputs);
        self.sink
            .consume(&self.frame, inputs)
            .map_err(|err| SurfaceError::Other(err.to_string()))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.frame = Frame::new(Viewport::new(0, 0));
        }
    }
}
