use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use settings::{AntialiasSetting, SurfaceSize};

#[derive(Parser, Debug)]
#[command(
    name = "backdrop",
    author,
    version,
    about = "Animated aurora background",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Settings file to use instead of the one in the config directory.
    #[arg(long, global = true, env = "BACKDROP_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Animate the aurora in a window (the default).
    Window(WindowArgs),
    /// Render one frame to a PNG file.
    Still(StillArgs),
    /// Run the animation headless and write every frame as a PNG.
    Frames(FramesArgs),
    /// Print the effective settings and where they were read from.
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<SurfaceSize>,

    /// Borderless fullscreen window kept below all other windows.
    #[arg(long)]
    pub backdrop: bool,

    /// Request a transparent surface so the desktop shows through dark areas.
    #[arg(long)]
    pub transparent: bool,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Present without waiting for vertical blank.
    #[arg(long)]
    pub no_vsync: bool,

    /// Seconds the animation advances per frame.
    #[arg(long, value_name = "SECONDS")]
    pub time_step: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct StillArgs {
    /// PNG file to write.
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,

    /// Animation time to capture (`12s`, `1m 30s`, or plain seconds).
    #[arg(long, value_name = "TIME", value_parser = parse_duration)]
    pub at: Option<Duration>,

    /// Image size (e.g. `1920x1080`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<SurfaceSize>,

    /// Keep the painted alpha instead of flattening onto black.
    #[arg(long)]
    pub transparent: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FramesArgs {
    /// Directory receiving `frame_NNNNN.png` files; created if missing.
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,

    /// Number of frames to paint.
    #[arg(long, value_name = "N")]
    pub count: Option<u32>,

    /// Frame size (e.g. `320x180`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<SurfaceSize>,

    /// Resize the surface after `K` frames, e.g. `30:640x360`.
    #[arg(long, value_name = "K:WIDTHxHEIGHT", value_parser = parse_resize_at)]
    pub resize_at: Option<ResizeAt>,

    /// Keep the painted alpha instead of flattening onto black.
    #[arg(long)]
    pub transparent: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Emit JSON instead of TOML.
    #[arg(long)]
    pub json: bool,
}

/// Mid-sequence resize applied once `after_frames` frames have been painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeAt {
    pub after_frames: u32,
    pub size: SurfaceSize,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<SurfaceSize, String> {
    value
        .parse::<SurfaceSize>()
        .map_err(|err| format!("invalid size '{}': {err}", value.trim()))
}

pub fn parse_antialias(value: &str) -> Result<AntialiasSetting, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }
    trimmed.parse::<AntialiasSetting>().map_err(|_| {
        format!("invalid anti-alias mode '{trimmed}'; use auto/off or 2/4/8/16")
    })
}

/// Accepts humantime strings (`1m 30s`, `250ms`) as well as bare seconds (`2.5`).
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time must not be empty".to_string());
    }
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(format!("time must be a non-negative number of seconds, got {trimmed}"));
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("time {trimmed} is out of range: {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid time '{trimmed}': {err}"))
}

pub fn parse_resize_at(value: &str) -> Result<ResizeAt, String> {
    let (frames, size) = value
        .trim()
        .split_once(':')
        .ok_or_else(|| format!("expected K:WIDTHxHEIGHT, got '{}'", value.trim()))?;
    let after_frames: u32 = frames
        .trim()
        .parse()
        .map_err(|_| format!("invalid frame index '{}'", frames.trim()))?;
    Ok(ResizeAt {
        after_frames,
        size: parse_size(size)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_opens_a_window() {
        let cli = Cli::try_parse_from(["backdrop", "--size", "800x600", "--fps", "30"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.window.size, Some(SurfaceSize::new(800, 600)));
        assert_eq!(cli.window.fps, Some(30.0));
        assert!(!cli.window.no_vsync);
    }

    #[test]
    fn window_flags_cannot_be_mixed_with_subcommands() {
        assert!(Cli::try_parse_from(["backdrop", "--backdrop", "still", "-o", "a.png"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["backdrop", "config", "--json", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Some(Command::Config(args)) => assert!(args.json),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_still_arguments() {
        let cli = Cli::try_parse_from([
            "backdrop", "still", "--output", "out.png", "--at", "1m 30s", "--size", "64x32",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Still(args)) => {
                assert_eq!(args.output, PathBuf::from("out.png"));
                assert_eq!(args.at, Some(Duration::from_secs(90)));
                assert_eq!(args.size, Some(SurfaceSize::new(64, 32)));
                assert!(!args.transparent);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("12s").unwrap(), Duration::from_secs(12));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2.5").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("1e30").is_err());
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parses_antialias_modes() {
        assert_eq!(parse_antialias("auto").unwrap(), AntialiasSetting::Auto);
        assert_eq!(parse_antialias(" OFF ").unwrap(), AntialiasSetting::Off);
        assert_eq!(parse_antialias("4").unwrap(), AntialiasSetting::Samples4);
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn parses_resize_points() {
        assert_eq!(
            parse_resize_at("30:640x360").unwrap(),
            ResizeAt {
                after_frames: 30,
                size: SurfaceSize::new(640, 360),
            }
        );
        assert!(parse_resize_at("640x360").is_err());
        assert!(parse_resize_at("x:640x360").is_err());
        assert!(parse_resize_at("3:0x360").is_err());
    }

    #[test]
    fn rejects_zero_sizes() {
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("wide").is_err());
    }
}
