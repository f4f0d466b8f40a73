//! Headless PNG output: single stills and whole frame sequences.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, bail, Context, Result};
use aurora::{
    drive, raster, BackgroundRenderer, Clock, Frame, FrameInputs, HeadlessHost, Phase, SinkError,
    Viewport,
};
use image::{ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::cli::ResizeAt;

/// What happens to the alpha the colour function accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Flattened onto black the way the live window presents it: the colour
    /// channels are shown as painted and alpha is ignored.
    #[default]
    Opaque,
    /// Alpha written as painted.
    Transparent,
}

impl AlphaMode {
    pub fn from_flag(transparent: bool) -> Self {
        if transparent {
            Self::Transparent
        } else {
            Self::Opaque
        }
    }
}

/// Writes `frame` to `path` as an 8-bit RGBA PNG.
pub fn write_png(path: &Path, frame: &Frame, alpha: AlphaMode) -> Result<(), SinkError> {
    let mut pixels = frame.pixels().to_vec();
    if alpha == AlphaMode::Opaque {
        for pixel in pixels.chunks_exact_mut(4) {
            pixel[3] = u8::MAX;
        }
    }
    let image = RgbaImage::from_raw(frame.width(), frame.height(), pixels).ok_or_else(|| {
        SinkError::Encode(format!("pixel buffer does not match {}", frame.viewport()))
    })?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|err| match err {
            image::ImageError::IoError(io) => SinkError::Io(io),
            other => SinkError::Encode(other.to_string()),
        })
}

pub fn frame_file_name(tick: u64) -> String {
    format!("frame_{tick:05}.png")
}

#[derive(Debug, Clone, PartialEq)]
pub struct StillReport {
    pub path: PathBuf,
    pub size: Viewport,
    pub tick: u64,
    pub time: f32,
}

/// Paints the frame the animation shows at `at_seconds`, snapped to the
/// nearest tick of `step`.
pub fn render_still(
    output: &Path,
    size: Viewport,
    at_seconds: f64,
    step: f64,
    alpha: AlphaMode,
) -> Result<StillReport> {
    if size.is_empty() {
        bail!("cannot render a {size} image");
    }
    let clock = Clock::starting_at(at_seconds, step);
    let inputs = FrameInputs {
        time: clock.uniform(),
        resolution: size.resolution(),
        tick: clock.ticks(),
    };

    let mut frame = Frame::new(size);
    raster::paint(&mut frame, &inputs);

    if let Some(parent) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    write_png(output, &frame, alpha)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), %size, time = inputs.time, ?alpha, "wrote still");

    Ok(StillReport {
        path: output.to_path_buf(),
        size,
        tick: inputs.tick,
        time: inputs.time,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceReport {
    pub frames: u64,
    pub final_size: Viewport,
    pub last_time: f64,
}

/// Runs the full lifecycle against a headless host: mount, `count` frame
/// callbacks with an optional resize part-way, then teardown.
pub fn render_frames(
    dir: &Path,
    count: u32,
    size: Viewport,
    resize_at: Option<ResizeAt>,
    step: f64,
    alpha: AlphaMode,
) -> Result<SequenceReport> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    // The renderer only logs a failed frame; keep the reason for the caller.
    let last_failure: Rc<RefCell<Option<String>>> = Rc::default();
    let sink_dir = dir.to_path_buf();
    let sink_failure = Rc::clone(&last_failure);
    let mut host = HeadlessHost::new(size, move || {
        let dir = sink_dir.clone();
        let failure = Rc::clone(&sink_failure);
        move |frame: &Frame, inputs: &FrameInputs| -> Result<(), SinkError> {
            let path = dir.join(frame_file_name(inputs.tick));
            if let Err(err) = write_png(&path, frame, alpha) {
                *failure.borrow_mut() = Some(err.to_string());
                return Err(err);
            }
            debug!(path = %path.display(), time = inputs.time, "wrote frame");
            Ok(())
        }
    });
    let mut renderer = BackgroundRenderer::with_clock(Clock::new(step));

    if renderer.mount(&mut host) != Phase::Running {
        bail!("background could not be mounted at {size}");
    }

    for index in 0..count {
        if let Some(resize) = resize_at.filter(|resize| resize.after_frames == index) {
            let viewport = Viewport::new(resize.size.width, resize.size.height);
            host.set_viewport(viewport);
            renderer.resize(viewport);
        }
        if drive(&mut renderer, &mut host, 1) == 0 {
            let tick = renderer.clock().ticks();
            renderer.teardown(&mut host);
            let reason = last_failure
                .borrow_mut()
                .take()
                .unwrap_or_else(|| "frame was not painted".to_string());
            return Err(anyhow!(reason).context(format!(
                "failed to write {}",
                dir.join(frame_file_name(tick)).display()
            )));
        }
    }

    let report = SequenceReport {
        frames: renderer.frames_rendered(),
        final_size: renderer.resolution(),
        last_time: renderer.clock().seconds(),
    };
    renderer.teardown(&mut host);
    debug_assert!(host.is_idle());
    Ok(report)
}
