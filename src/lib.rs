// SPDX-License-Identifier: GPL-3.0-only

//! Barcode Scanner - a camera-driven barcode scan session controller
//!
//! This library provides the scan session state machine together with the
//! camera, decoding and feedback plumbing it drives.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Session controller, device selection and decoding
//! - [`backends`]: Camera and audio backend abstraction
//! - [`torch`]: Sysfs torch LED control
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let camera = CameraBackendManager::new(Box::new(V4l2Backend::new()));
//! let mut controller = SessionController::new(
//!     Config::default(),
//!     camera,
//!     Arc::new(QrDecoder::new()),
//!     Box::new(TerminalFeedback::new(SuccessCue::default())),
//! );
//! controller.init();
//! while controller.process_next().await {}
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod torch;

// Re-export commonly used types
pub use app::{
    BarcodeFormat, DecodeEngine, Decoded, FeedbackMessage, FeedbackSink, LifecycleState, Message,
    PermissionState, QrDecoder, Session, SessionController, SessionSnapshot, TerminalFeedback,
    select_device,
};
pub use backends::camera::{CameraBackend, CameraBackendManager, CameraDevice};
pub use config::Config;
pub use errors::{AppError, AppResult};
