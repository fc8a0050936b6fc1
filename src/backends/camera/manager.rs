// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend lifecycle manager
//!
//! The manager provides:
//! - Thread-safe backend access, so blocking calls can move to worker threads
//! - The single-acquisition guarantee: a second `acquire` fails until `release`
//! - Frame waits that never hold the backend lock for longer than one poll slice

use super::CameraBackend;
use super::types::*;
use crate::constants::FRAME_POLL_SLICE;
use crate::errors::PermissionError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Internal manager state
struct ManagerState {
    /// The active backend instance
    backend: Box<dyn CameraBackend>,
    /// Device currently acquired through this manager
    acquired: Option<CameraDevice>,
}

/// Camera backend manager
///
/// Cheap to clone; all clones share the same backend.
#[derive(Clone)]
pub struct CameraBackendManager {
    state: Arc<Mutex<ManagerState>>,
}

impl CameraBackendManager {
    /// Create a new backend manager
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        info!(backend = %backend.backend_type(), "Creating camera backend manager");

        Self {
            state: Arc::new(Mutex::new(ManagerState {
                backend,
                acquired: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        // A panic inside a backend call must not wedge release()
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the backend type
    pub fn backend_type(&self) -> CameraBackendType {
        self.lock().backend.backend_type()
    }

    /// Request camera access
    pub fn request_access(&self, constraints: &CameraConstraints) -> Result<(), PermissionError> {
        debug!(
            min = %constraints.min,
            ideal = %constraints.ideal,
            facing = ?constraints.facing_mode,
            "Requesting camera access"
        );
        self.lock().backend.request_access(constraints)
    }

    /// Enumerate available devices
    pub fn enumerate_devices(&self) -> BackendResult<Vec<CameraDevice>> {
        let devices = self.lock().backend.enumerate_devices()?;
        debug!(count = devices.len(), "Enumerated camera devices");
        Ok(devices)
    }

    /// Acquire a device for streaming
    pub fn acquire(&self, device: &CameraDevice, constraints: &CameraConstraints) -> BackendResult<()> {
        let mut state = self.lock();

        if let Some(current) = &state.acquired {
            warn!(
                current = %current.display_name(),
                requested = %device.display_name(),
                "Refusing second camera acquisition"
            );
            return Err(BackendError::DeviceBusy);
        }

        info!(device = %device.display_name(), "Acquiring camera");
        state.backend.acquire(device, constraints)?;
        state.acquired = Some(device.clone());
        Ok(())
    }

    /// Release the acquired device, if any
    pub fn release(&self) {
        let mut state = self.lock();
        if let Some(device) = state.acquired.take() {
            info!(device = %device.display_name(), "Releasing camera");
            state.backend.release();
        }
    }

    /// Check if a device is acquired
    pub fn is_acquired(&self) -> bool {
        self.lock().acquired.is_some()
    }

    /// Device currently acquired
    pub fn acquired_device(&self) -> Option<CameraDevice> {
        self.lock().acquired.clone()
    }

    /// Pull the next frame from the acquired device
    ///
    /// The wait is split into slices of at most [`FRAME_POLL_SLICE`] and the
    /// lock is dropped between them, so `release` and `set_torch` never queue
    /// behind a whole frame timeout. Setting `cancelled` ends the wait at the
    /// next slice boundary with [`BackendError::Timeout`].
    pub fn next_frame(
        &self,
        timeout: Duration,
        cancelled: &AtomicBool,
    ) -> BackendResult<CameraFrame> {
        let deadline = Instant::now() + timeout;
        loop {
            if cancelled.load(Ordering::Acquire) {
                return Err(BackendError::Timeout);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(BackendError::Timeout);
            }

            let mut state = self.lock();
            if state.acquired.is_none() {
                return Err(BackendError::NotAcquired);
            }
            match state.backend.next_frame(remaining.min(FRAME_POLL_SLICE)) {
                Err(BackendError::Timeout) => {}
                other => return other,
            }
        }
    }

    /// Switch the torch of the acquired device
    pub fn set_torch(&self, enabled: bool) -> BackendResult<()> {
        let mut state = self.lock();
        if state.acquired.is_none() {
            return Err(BackendError::NotAcquired);
        }
        state.backend.set_torch(enabled)
    }
}
