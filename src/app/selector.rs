// SPDX-License-Identifier: GPL-3.0-only

//! Camera selection
//!
//! Picks the camera best suited for scanning from an enumerated list. Rear
//! cameras are preferred because they face away from the operator, and among
//! those a high-resolution one. Matching is on the lowercased label.

use crate::backends::camera::{CameraDevice, DeviceKind};

const REAR_KEYWORDS: [&str; 2] = ["back", "rear"];
const HIGH_RES_KEYWORDS: [&str; 2] = ["hd", "high"];

/// Choose a video input device
///
/// Preference order:
/// 1. a rear camera whose label also suggests high resolution
/// 2. the first rear camera
/// 3. the first video input
///
/// Non-video devices are never chosen. Returns `None` when no video input
/// exists.
pub fn select_device(devices: &[CameraDevice]) -> Option<&CameraDevice> {
    let video_inputs = devices.iter().filter(|d| d.kind == DeviceKind::VideoInput);

    let first = video_inputs.clone().next()?;
    let mut first_rear = None;

    for device in video_inputs {
        let label = device.label.to_lowercase();
        if !contains_any(&label, &REAR_KEYWORDS) {
            continue;
        }
        if contains_any(&label, &HIGH_RES_KEYWORDS) {
            return Some(device);
        }
        if first_rear.is_none() {
            first_rear = Some(device);
        }
    }

    Some(first_rear.unwrap_or(first))
}

fn contains_any(label: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| label.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(label: &str) -> CameraDevice {
        CameraDevice::video_input(label.to_lowercase().replace(' ', "-"), label)
    }

    #[test]
    fn test_empty_list() {
        assert!(select_device(&[]).is_none());
    }

    #[test]
    fn test_high_res_rear_wins_over_earlier_rear() {
        let devices = vec![video("Front"), video("Rear Camera"), video("Back Camera HD")];
        assert_eq!(select_device(&devices).map(|d| d.label.as_str()), Some("Back Camera HD"));
    }

    #[test]
    fn test_case_insensitive() {
        let devices = vec![video("Front"), video("REAR HIGH")];
        assert_eq!(select_device(&devices).map(|d| d.label.as_str()), Some("REAR HIGH"));
    }

    #[test]
    fn test_audio_devices_ignored() {
        let devices = vec![CameraDevice {
            kind: DeviceKind::AudioInput,
            ..video("Back Microphone HD")
        }];
        assert!(select_device(&devices).is_none());
    }
}
