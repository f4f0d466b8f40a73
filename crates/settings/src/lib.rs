//! `backdrop.toml` parsing and validation.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! usable configuration. Durations accept humantime strings (`"12s"`,
//! `"1m 30s"`) or plain seconds.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use aurora::DEFAULT_TIME_STEP;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Name of the configuration file looked up in the config directory.
pub const FILE_NAME: &str = "backdrop.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Width and height in physical pixels, written as `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for SurfaceSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let (w, h) = normalized
            .split_once('x')
            .ok_or_else(|| "expected format WIDTHxHEIGHT".to_string())?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{}'", w.trim()))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{}'", h.trim()))?;
        if width == 0 || height == 0 {
            return Err("dimensions must be greater than zero".into());
        }
        Ok(Self { width, height })
    }
}

impl Serialize for SurfaceSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SurfaceSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|err| de::Error::custom(format!("invalid size '{raw}': {err}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AntialiasSetting {
    #[default]
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    /// MSAA sample count, or `None` for automatic selection.
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

impl fmt::Display for AntialiasSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.samples() {
            None => f.write_str("auto"),
            Some(1) => f.write_str("off"),
            Some(samples) => write!(f, "{samples}"),
        }
    }
}

impl FromStr for AntialiasSetting {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "auto" | "max" | "default" => Ok(Self::Auto),
            "off" | "none" | "disable" | "disabled" | "0" => Ok(Self::Off),
            "2" => Ok(Self::Samples2),
            "4" => Ok(Self::Samples4),
            "8" => Ok(Self::Samples8),
            "16" => Ok(Self::Samples16),
            other => Err(format!("invalid antialias setting '{other}'")),
        }
    }
}

impl Serialize for AntialiasSetting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AntialiasSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Str(String),
            Num(i64),
        }

        match Helper::deserialize(deserializer)? {
            Helper::Str(raw) => raw.parse().map_err(de::Error::custom),
            Helper::Num(value) if value < 0 => {
                Err(de::Error::custom("antialias value must be non-negative"))
            }
            Helper::Num(value) => value.to_string().parse().map_err(de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Seconds the clock advances per painted frame.
    pub time_step: f64,
    /// Frame rate cap; `0` leaves pacing to the present mode.
    pub max_fps: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSettings {
    pub size: SurfaceSize,
    pub title: String,
    pub backdrop: bool,
    pub transparent: bool,
    pub antialias: AntialiasSetting,
    pub vsync: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportSettings {
    pub size: SurfaceSize,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub at: Duration,
    pub frames: u32,
    /// Keep the colour function's alpha in exported PNGs instead of
    /// flattening onto black like the live window.
    pub transparent: bool,
}

fn default_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            animation: AnimationSettings::default(),
            window: WindowSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            max_fps: 0.0,
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            size: SurfaceSize::new(1280, 720),
            title: "Aurora".to_string(),
            backdrop: false,
            transparent: false,
            antialias: AntialiasSetting::Auto,
            vsync: true,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            size: SurfaceSize::new(1920, 1080),
            at: Duration::ZERO,
            frames: 60,
            transparent: false,
        }
    }
}

fn serialize_duration<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_duration(*value))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("duration {v} out of range: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: Settings = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Frame rate cap, `None` when uncapped.
    pub fn fps_cap(&self) -> Option<f32> {
        (self.animation.max_fps > 0.0).then_some(self.animation.max_fps)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        let step = self.animation.time_step;
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "animation.time_step must be a positive number of seconds, got {step}"
            )));
        }

        let fps = self.animation.max_fps;
        if !fps.is_finite() || fps < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "animation.max_fps must be >= 0, got {fps}"
            )));
        }

        if self.window.title.trim().is_empty() {
            return Err(ConfigError::Invalid("window.title may not be empty".into()));
        }

        if self.export.frames == 0 {
            return Err(ConfigError::Invalid(
                "export.frames must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[animation]
time_step = 0.02
max_fps = 30

[window]
size = "1024x768"
title = "Lights"
backdrop = true
transparent = true
antialias = 4
vsync = false

[export]
size = "640x360"
at = "12s"
frames = 10
transparent = true
"#;

    #[test]
    fn parses_sample_config() {
        let settings = Settings::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(settings.animation.time_step, 0.02);
        assert_eq!(settings.fps_cap(), Some(30.0));
        assert_eq!(settings.window.size, SurfaceSize::new(1024, 768));
        assert_eq!(settings.window.title, "Lights");
        assert!(settings.window.backdrop);
        assert!(settings.window.transparent);
        assert_eq!(settings.window.antialias, AntialiasSetting::Samples4);
        assert!(!settings.window.vsync);
        assert_eq!(settings.export.size, SurfaceSize::new(640, 360));
        assert_eq!(settings.export.at, Duration::from_secs(12));
        assert_eq!(settings.export.frames, 10);
        assert!(settings.export.transparent);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::from_toml_str("").expect("parse empty config");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.animation.time_step, 0.016);
        assert_eq!(settings.fps_cap(), None);
        assert!(settings.window.vsync);
        assert!(!settings.export.transparent);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::from_toml_str(
            r#"
[window]
backdrop = true
"#,
        )
        .unwrap();
        assert!(settings.window.backdrop);
        assert_eq!(settings.window.size, SurfaceSize::new(1280, 720));
        assert_eq!(settings.export, ExportSettings::default());
    }

    #[test]
    fn durations_accept_plain_seconds() {
        let settings = Settings::from_toml_str("[export]\nat = 3\n").unwrap();
        assert_eq!(settings.export.at, Duration::from_secs(3));
        let settings = Settings::from_toml_str("[export]\nat = 1.5\n").unwrap();
        assert_eq!(settings.export.at, Duration::from_millis(1500));
        assert!(Settings::from_toml_str("[export]\nat = -1\n").is_err());
    }

    #[test]
    fn oversized_durations_are_rejected() {
        let err = Settings::from_toml_str("[export]\nat = 1e30\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = Settings::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_time_step() {
        for step in ["0.0", "-0.016"] {
            let err = Settings::from_toml_str(&format!("[animation]\ntime_step = {step}\n"))
                .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "step {step}");
        }
    }

    #[test]
    fn rejects_zero_sized_windows() {
        let err = Settings::from_toml_str("[window]\nsize = \"0x600\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn antialias_parsing_matches_cli_vocabulary() {
        assert_eq!("auto".parse(), Ok(AntialiasSetting::Auto));
        assert_eq!("None".parse(), Ok(AntialiasSetting::Off));
        assert_eq!("8".parse(), Ok(AntialiasSetting::Samples8));
        assert!("3".parse::<AntialiasSetting>().is_err());
        assert_eq!(AntialiasSetting::Samples16.to_string(), "16");
        assert_eq!(AntialiasSetting::from_samples(2), Some(AntialiasSetting::Samples2));
    }

    #[test]
    fn surface_size_parsing() {
        assert_eq!("1920x1080".parse(), Ok(SurfaceSize::new(1920, 1080)));
        assert_eq!(" 800 X 600 ".parse(), Ok(SurfaceSize::new(800, 600)));
        assert!("1920".parse::<SurfaceSize>().is_err());
        assert!("axb".parse::<SurfaceSize>().is_err());
    }

    #[test]
    fn serialized_settings_parse_back() {
        let settings = Settings::from_toml_str(SAMPLE).unwrap();
        let rendered = settings.to_toml_string().unwrap();
        assert!(rendered.contains("size = \"1024x768\""));
        assert!(rendered.contains("at = \"12s\""));
        assert_eq!(Settings::from_toml_str(&rendered).unwrap(), settings);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        assert_eq!(Settings::load_or_default(&path).unwrap(), Settings::default());

        std::fs::write(&path, "[animation]\nmax_fps = 24\n").unwrap();
        assert_eq!(Settings::load_or_default(&path).unwrap().fps_cap(), Some(24.0));

        let err = Settings::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
