// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for camera selection

use barcode_scanner::backends::camera::{CameraDevice, DeviceKind};
use barcode_scanner::select_device;

fn cameras(labels: &[&str]) -> Vec<CameraDevice> {
    labels
        .iter()
        .enumerate()
        .map(|(index, label)| CameraDevice::video_input(format!("video{}", index), *label))
        .collect()
}

fn selected_label(devices: &[CameraDevice]) -> Option<&str> {
    select_device(devices).map(|device| device.label.as_str())
}

#[test]
fn test_prefers_rear_high_resolution_camera() {
    let devices = cameras(&["Front Camera", "Back Camera HD"]);
    assert_eq!(selected_label(&devices), Some("Back Camera HD"));
}

#[test]
fn test_falls_back_to_first_video_input() {
    let devices = cameras(&["Front Camera"]);
    assert_eq!(selected_label(&devices), Some("Front Camera"));
}

#[test]
fn test_no_devices() {
    assert!(select_device(&[]).is_none());
}

#[test]
fn test_rear_without_high_resolution() {
    // The first rear camera wins when none advertises high resolution
    let devices = cameras(&["Integrated Webcam", "Rear Camera", "Back Camera"]);
    assert_eq!(selected_label(&devices), Some("Rear Camera"));
}

#[test]
fn test_high_resolution_alone_is_not_rear() {
    let devices = cameras(&["HD Webcam", "Front High Camera"]);
    assert_eq!(selected_label(&devices), Some("HD Webcam"));
}

#[test]
fn test_skips_non_video_devices() {
    let mut devices = cameras(&["Back Camera HD Microphone", "USB Camera"]);
    devices[0].kind = DeviceKind::AudioInput;
    assert_eq!(selected_label(&devices), Some("USB Camera"));

    devices[1].kind = DeviceKind::Other;
    assert!(select_device(&devices).is_none());
}

#[test]
fn test_empty_labels_are_eligible() {
    // Labels can be empty before permission is granted
    let devices = cameras(&["", ""]);
    assert_eq!(select_device(&devices).map(|d| d.id.as_str()), Some("video0"));
}
