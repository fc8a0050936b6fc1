// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use crate::constants::resolution;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Camera backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CameraBackendType {
    /// Native V4L2 capture devices
    #[default]
    V4l2,
    /// Still images standing in for a camera
    StillImage,
    /// Anything provided by the embedding host
    External,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::V4l2 => write!(f, "V4L2"),
            CameraBackendType::StillImage => write!(f, "still image"),
            CameraBackendType::External => write!(f, "external"),
        }
    }
}

/// Kind of media device reported by enumeration
///
/// Only `VideoInput` devices are eligible for scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceKind {
    #[default]
    VideoInput,
    AudioInput,
    Other,
}

impl DeviceKind {
    /// Name as used by media device enumeration ("videoinput", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::VideoInput => "videoinput",
            DeviceKind::AudioInput => "audioinput",
            DeviceKind::Other => "other",
        }
    }
}

/// Represents a camera device
///
/// The controller only records which device is in use; the backend owns the
/// actual hardware handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CameraDevice {
    /// Stable identifier within one enumeration (e.g. "video0")
    pub id: String,
    /// Human readable label, may be empty before permission is granted
    pub label: String,
    pub kind: DeviceKind,
    /// Device node or file backing the device
    pub path: String,
}

impl CameraDevice {
    /// Create a video input device
    pub fn video_input(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: DeviceKind::VideoInput,
            path: String::new(),
        }
    }

    /// Set the backing path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Label for logs and UI, falling back to the id when the label is empty
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

/// Capture resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether this resolution is at least `other` in both dimensions
    pub fn covers(&self, other: &Resolution) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Preferred camera orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, facing away from the operator
    #[default]
    Environment,
    /// Front camera, facing the operator
    User,
}

/// Constraints passed to the camera backend when requesting access.
///
/// The controller forwards these verbatim and never validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConstraints {
    pub min: Resolution,
    pub ideal: Resolution,
    pub facing_mode: FacingMode,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            min: Resolution::new(resolution::MIN_WIDTH, resolution::MIN_HEIGHT),
            ideal: Resolution::new(resolution::IDEAL_WIDTH, resolution::IDEAL_HEIGHT),
            facing_mode: FacingMode::Environment,
        }
    }
}

/// Pixel layout of a frame handed to the decode engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit luma, one byte per pixel
    Gray8,
    /// 8-bit RGBA, four bytes per pixel
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// A single captured frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap a tightly packed greyscale buffer
    pub fn from_gray(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            format: PixelFormat::Gray8,
            stride: width,
            captured_at: Instant::now(),
        }
    }

    /// Same pixels, new capture timestamp
    pub fn recaptured(&self) -> Self {
        Self {
            captured_at: Instant::now(),
            ..self.clone()
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Failed to open or configure the device
    InitializationFailed(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// A device is already acquired; release it first
    DeviceBusy,
    /// No device is acquired
    NotAcquired,
    /// No frame arrived within the timeout
    Timeout,
    /// The capture thread stopped unexpectedly
    Crashed(String),
    /// The device has no controllable torch
    TorchUnsupported,
    /// General I/O error
    IoError(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::DeviceBusy => write!(f, "A camera is already acquired"),
            BackendError::NotAcquired => write!(f, "No camera acquired"),
            BackendError::Timeout => write!(f, "Timed out waiting for a frame"),
            BackendError::Crashed(msg) => write!(f, "Capture stopped: {}", msg),
            BackendError::TorchUnsupported => write!(f, "Torch not supported"),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_id() {
        let device = CameraDevice::video_input("video2", "");
        assert_eq!(device.display_name(), "video2");

        let device = CameraDevice::video_input("video2", "Integrated Camera");
        assert_eq!(device.display_name(), "Integrated Camera");
    }

    #[test]
    fn test_default_constraints_prefer_rear_camera() {
        let constraints = CameraConstraints::default();
        assert_eq!(constraints.facing_mode, FacingMode::Environment);
        assert!(constraints.ideal.covers(&constraints.min));
    }

    #[test]
    fn test_from_gray_is_tightly_packed() {
        let frame = CameraFrame::from_gray(3, 2, vec![0; 6]);
        assert_eq!(frame.stride, 3);
        assert_eq!(frame.format.bytes_per_pixel(), 1);
        assert_eq!(frame.data.len(), 6);
    }

    #[test]
    fn test_facing_mode_serializes_lowercase() {
        let json = serde_json::to_string(&FacingMode::Environment).unwrap();
        assert_eq!(json, "\"environment\"");
    }
}
