// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  SessionController  │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackendManager│  ← Shared access, single acquisition
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← Common interface
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//!    ┌──────┐ ┌───────────┐
//!    │ V4L2 │ │Still image│
//!    └──────┘ └───────────┘
//! ```

pub mod file_source;
pub mod manager;
pub mod types;
pub mod v4l2;

pub use file_source::FileSourceBackend;
pub use manager::CameraBackendManager;
pub use types::*;
pub use v4l2::V4l2Backend;

use crate::errors::PermissionError;
use std::time::Duration;

/// Camera backend trait
///
/// Every method may block; the session controller only calls them from
/// tokio's blocking pool or for short synchronous operations.
pub trait CameraBackend: Send {
    // ===== Permission & enumeration =====

    /// Ask for access to the camera subsystem
    ///
    /// # Arguments
    /// * `constraints` - Resolution and facing preferences, passed through verbatim
    fn request_access(&mut self, constraints: &CameraConstraints) -> Result<(), PermissionError>;

    /// Enumerate the devices visible to this backend
    fn enumerate_devices(&mut self) -> BackendResult<Vec<CameraDevice>>;

    // ===== Lifecycle =====

    /// Open `device` and start delivering frames
    ///
    /// # Returns
    /// * `Ok(())` - Frames can be pulled with [`CameraBackend::next_frame`]
    /// * `Err(BackendError::DeviceBusy)` - A device is already acquired
    fn acquire(&mut self, device: &CameraDevice, constraints: &CameraConstraints)
    -> BackendResult<()>;

    /// Stop delivering frames and close the device.
    ///
    /// Must be a no-op when nothing is acquired.
    fn release(&mut self);

    /// Check if a device is currently acquired
    fn is_acquired(&self) -> bool;

    // ===== Frames =====

    /// Block until the next frame arrives or `timeout` passes
    ///
    /// # Returns
    /// * `Err(BackendError::Timeout)` - No frame in time, try again
    /// * `Err(BackendError::NotAcquired)` - Nothing to pull from
    fn next_frame(&mut self, timeout: Duration) -> BackendResult<CameraFrame>;

    // ===== Torch =====

    /// Switch the torch LED of the acquired device
    fn set_torch(&mut self, _enabled: bool) -> BackendResult<()> {
        Err(BackendError::TorchUnsupported)
    }

    // ===== Metadata =====

    /// Get the backend type identifier
    fn backend_type(&self) -> CameraBackendType;
}
