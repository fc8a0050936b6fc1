// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use barcode_scanner::app::BarcodeFormat;
use barcode_scanner::backends::camera::FacingMode;
use barcode_scanner::{AppError, Config};
use std::time::Duration;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(
        config.allowed_formats,
        vec![BarcodeFormat::QrCode, BarcodeFormat::Code128]
    );
    assert_eq!(config.success_display(), Duration::from_millis(2000));
    assert!(config.success_cue, "Success cue should be enabled by default");
    assert!(config.success_sound.is_none());
    assert_eq!(config.constraints.facing_mode, FacingMode::Environment);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("missing.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "allowed_formats": ["EAN13"], "success_display_ms": 500 }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.allowed_formats, vec![BarcodeFormat::Ean13]);
    assert_eq!(config.success_display(), Duration::from_millis(500));
    assert!(config.success_cue);
    assert_eq!(config.frame_timeout(), Config::default().frame_timeout());
}

#[test]
fn test_invalid_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = Config {
        success_cue: false,
        frame_timeout_ms: 750,
        ..Config::default()
    };

    config.save_to(&path).unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), config);
}
