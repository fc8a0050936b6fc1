// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the barcode scanner
//!
//! None of these escape the session controller: it turns every failure into a
//! feedback message. They are returned by the collaborators (camera backend,
//! decode engine, feedback sink) and by the configuration and CLI layers.

use crate::backends::camera::BackendError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error type used outside the controller
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera backend failure
    Backend(BackendError),
    /// Camera permission could not be obtained
    Permission(PermissionError),
    /// Configuration errors
    Config(String),
    /// Filesystem errors
    Io(String),
    /// Generic error with message
    Other(String),
}

/// Outcome of a failed camera permission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The operator or the system refused access to the camera
    Denied,
    /// The environment has no camera subsystem at all
    Unsupported(String),
}

/// Per-frame decode failure
///
/// These are expected during normal operation: most frames do not contain a
/// readable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No barcode was found in the frame
    NotFound,
    /// A barcode was located but could not be decoded
    Unreadable(String),
    /// The engine cannot decode any of the allowed formats
    FormatNotAllowed,
}

/// Failure to play the success cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    /// No audio output is available
    Unavailable(String),
    /// Playback was attempted and failed
    Failed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Backend(e) => write!(f, "Camera error: {}", e),
            AppError::Permission(e) => write!(f, "Permission error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Io(msg) => write!(f, "I/O error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::Denied => write!(f, "Camera access denied"),
            PermissionError::Unsupported(msg) => write!(f, "Camera not supported: {}", msg),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NotFound => write!(f, "No barcode in frame"),
            DecodeError::Unreadable(msg) => write!(f, "Barcode unreadable: {}", msg),
            DecodeError::FormatNotAllowed => write!(f, "No supported format is allowed"),
        }
    }
}

impl fmt::Display for CueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CueError::Unavailable(msg) => write!(f, "Audio unavailable: {}", msg),
            CueError::Failed(msg) => write!(f, "Playback failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PermissionError {}
impl std::error::Error for DecodeError {}
impl std::error::Error for CueError {}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Backend(err)
    }
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_wraps_backend_error() {
        let err: AppError = BackendError::DeviceBusy.into();
        assert!(matches!(err, AppError::Backend(BackendError::DeviceBusy)));
        assert!(err.to_string().starts_with("Camera error"));
    }

    #[test]
    fn test_permission_error_display() {
        assert_eq!(PermissionError::Denied.to_string(), "Camera access denied");
        assert!(
            PermissionError::Unsupported("no video4linux".into())
                .to_string()
                .contains("no video4linux")
        );
    }

    #[test]
    fn test_io_error_becomes_io_variant() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(AppError::from(io), AppError::Io(msg) if msg == "missing"));
    }
}
