use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn backdrop(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_backdrop"))
        .env("BACKDROP_CONFIG_DIR", config_dir)
        .env_remove("BACKDROP_CONFIG")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run backdrop")
}

#[test]
fn still_writes_png_of_requested_size() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("shots/still.png");

    let result = backdrop(
        root.path(),
        &[
            "still",
            "--output",
            output.to_str().unwrap(),
            "--at",
            "2s",
            "--size",
            "32x18",
        ],
    );

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(image::image_dimensions(&output).unwrap(), (32, 18));
    let decoded = image::open(&output).unwrap().to_rgba8();
    assert!(decoded.pixels().all(|pixel| pixel.0[3] == u8::MAX));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("tick 125"), "{stdout}");
}

#[test]
fn still_uses_export_size_from_config_dir() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("backdrop.toml"),
        "[export]\nsize = \"16x9\"\nat = \"1s\"\n",
    )
    .unwrap();
    let output = root.path().join("still.png");

    let result = backdrop(root.path(), &["still", "-o", output.to_str().unwrap()]);

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(image::image_dimensions(&output).unwrap(), (16, 9));
}

#[test]
fn frames_follow_a_mid_sequence_resize() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("frames");

    let result = backdrop(
        root.path(),
        &[
            "frames",
            "--dir",
            dir.to_str().unwrap(),
            "--count",
            "3",
            "--size",
            "8x6",
            "--resize-at",
            "2:12x9",
        ],
    );

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(image::image_dimensions(dir.join("frame_00001.png")).unwrap(), (8, 6));
    assert_eq!(image::image_dimensions(dir.join("frame_00002.png")).unwrap(), (8, 6));
    assert_eq!(image::image_dimensions(dir.join("frame_00003.png")).unwrap(), (12, 9));
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 3);
}

#[test]
fn config_json_reports_defaults_when_file_is_missing() {
    let root = TempDir::new().unwrap();

    let result = backdrop(root.path(), &["config", "--json"]);

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let report: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(report["loaded_from_file"], false);
    assert_eq!(report["settings"]["animation"]["time_step"], 0.016);
    assert_eq!(report["settings"]["window"]["size"], "1280x720");
    assert!(report["config_file"]
        .as_str()
        .unwrap()
        .ends_with("backdrop.toml"));
}

#[test]
fn config_flag_points_at_an_explicit_file() {
    let root = TempDir::new().unwrap();
    let file = root.path().join("custom.toml");
    fs::write(&file, "[animation]\ntime_step = 0.032\n").unwrap();

    let result = backdrop(
        root.path(),
        &["config", "--json", "--config", file.to_str().unwrap()],
    );

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let report: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(report["loaded_from_file"], true);
    assert_eq!(report["settings"]["animation"]["time_step"], 0.032);
}

#[test]
fn invalid_config_fails_loudly() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("backdrop.toml"), "[animation]\ntime_step = -1.0\n").unwrap();

    let result = backdrop(root.path(), &["config"]);

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("time_step"));
}

#[test]
fn zero_sized_still_is_rejected() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("never.png");

    let result = backdrop(
        root.path(),
        &["still", "--output", output.to_str().unwrap(), "--size", "0x10"],
    );

    assert!(!result.status.success());
    assert!(!output.exists());
}
