use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aurora::Viewport;
use renderer::{Antialiasing, GpuOptions, Placement, Renderer, SurfaceAlpha, WindowConfig};
use serde::Serialize;
use settings::{AntialiasSetting, Settings, SurfaceSize};
use tracing_subscriber::EnvFilter;

use crate::cli::{ConfigArgs, FramesArgs, StillArgs, WindowArgs};
use crate::export::{self, AlphaMode};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Settings together with the file they were (or would have been) read from.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub source: PathBuf,
    pub from_file: bool,
    pub settings: Settings,
}

/// An explicit `--config` file must exist; the per-user file is optional.
pub fn load_settings(explicit: Option<&Path>) -> Result<LoadedSettings> {
    if let Some(path) = explicit {
        let settings = Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?;
        return Ok(LoadedSettings {
            source: path.to_path_buf(),
            from_file: true,
            settings,
        });
    }

    let paths = AppPaths::discover()?;
    let source = paths.config_file();
    let from_file = source.is_file();
    let settings = Settings::load_or_default(&source)
        .with_context(|| format!("failed to load settings from {}", source.display()))?;
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        file = %source.display(),
        from_file,
        "resolved backdrop settings"
    );
    Ok(LoadedSettings {
        source,
        from_file,
        settings,
    })
}

/// Layers command-line flags over the loaded settings and re-validates the
/// result.
pub fn apply_window_args(mut settings: Settings, args: &WindowArgs) -> Result<Settings> {
    if let Some(size) = args.size {
        settings.window.size = size;
    }
    if args.backdrop {
        settings.window.backdrop = true;
    }
    if args.transparent {
        settings.window.transparent = true;
    }
    if let Some(fps) = args.fps {
        settings.animation.max_fps = fps;
    }
    if let Some(antialias) = args.antialias {
        settings.window.antialias = antialias;
    }
    if args.no_vsync {
        settings.window.vsync = false;
    }
    if let Some(step) = args.time_step {
        settings.animation.time_step = step;
    }
    settings.validate()?;
    Ok(settings)
}

pub fn window_config(settings: &Settings) -> WindowConfig {
    let window = &settings.window;
    WindowConfig {
        size: (window.size.width, window.size.height),
        title: window.title.clone(),
        placement: if window.backdrop {
            Placement::Backdrop
        } else {
            Placement::Windowed
        },
        gpu: GpuOptions {
            antialiasing: map_antialias(window.antialias),
            surface_alpha: if window.transparent {
                SurfaceAlpha::Transparent
            } else {
                SurfaceAlpha::Opaque
            },
            vsync: window.vsync,
            ..GpuOptions::default()
        },
        max_fps: settings.fps_cap(),
        time_step: settings.animation.time_step,
    }
}

fn map_antialias(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

fn viewport(size: SurfaceSize) -> Viewport {
    Viewport::new(size.width, size.height)
}

pub fn run_window(args: &WindowArgs, loaded: LoadedSettings) -> Result<()> {
    let settings = apply_window_args(loaded.settings, args)?;
    Renderer::new(window_config(&settings)).run()
}

pub fn run_still(args: &StillArgs, loaded: LoadedSettings) -> Result<()> {
    let settings = loaded.settings;
    let size = args.size.unwrap_or(settings.export.size);
    let at = args.at.unwrap_or(settings.export.at);
    let report = export::render_still(
        &args.output,
        viewport(size),
        at.as_secs_f64(),
        settings.animation.time_step,
        AlphaMode::from_flag(args.transparent || settings.export.transparent),
    )?;
    println!(
        "{} ({}, t={:.3}s, tick {})",
        report.path.display(),
        report.size,
        report.time,
        report.tick
    );
    Ok(())
}

pub fn run_frames(args: &FramesArgs, loaded: LoadedSettings) -> Result<()> {
    let settings = loaded.settings;
    let count = args.count.unwrap_or(settings.export.frames);
    let size = args.size.unwrap_or(settings.export.size);
    let report = export::render_frames(
        &args.dir,
        count,
        viewport(size),
        args.resize_at,
        settings.animation.time_step,
        AlphaMode::from_flag(args.transparent || settings.export.transparent),
    )?;
    println!(
        "wrote {} frames to {} (final size {}, t={:.3}s)",
        report.frames,
        args.dir.display(),
        report.final_size,
        report.last_time
    );
    Ok(())
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    config_file: &'a Path,
    loaded_from_file: bool,
    settings: &'a Settings,
}

pub fn run_config(args: &ConfigArgs, loaded: LoadedSettings) -> Result<()> {
    if args.json {
        let report = ConfigReport {
            config_file: &loaded.source,
            loaded_from_file: loaded.from_file,
            settings: &loaded.settings,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let status = if loaded.from_file { "" } else { " (not found; defaults)" };
    println!("# {}{status}", loaded.source.display());
    print!("{}", loaded.settings.to_toml_string()?);
    Ok(())
}
