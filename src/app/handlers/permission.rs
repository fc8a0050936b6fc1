// SPDX-License-Identifier: GPL-3.0-only

//! Permission and device selection handlers
//!
//! Both steps call the camera backend on the blocking pool. Their results come
//! back tagged with the attempt that started them; a result for an attempt
//! that was cancelled or superseded is dropped.

use crate::app::SessionController;
use crate::app::feedback::FeedbackMessage;
use crate::app::selector::select_device;
use crate::app::state::{LifecycleState, Message, PermissionState};
use crate::backends::camera::{BackendError, BackendResult, CameraDevice};
use crate::errors::PermissionError;
use std::future::Future;
use tracing::{debug, info, warn};

impl SessionController {
    pub(crate) fn handle_init(&mut self) {
        if self.session.lifecycle != LifecycleState::Idle {
            debug!(state = %self.session.lifecycle, "Ignoring init outside idle");
            return;
        }
        self.request_permission();
    }

    /// Start a new permission attempt
    pub(crate) fn request_permission(&mut self) {
        self.session.attempt += 1;
        let attempt = self.session.attempt;
        self.transition(
            LifecycleState::AwaitingPermission,
            FeedbackMessage::RequestingPermission,
        );

        let camera = self.camera.clone();
        let constraints = self.config.constraints;
        let sender = self.sender.clone();
        self.spawn_request(async move {
            let result =
                match tokio::task::spawn_blocking(move || camera.request_access(&constraints)).await
                {
                    Ok(result) => result,
                    Err(e) => Err(PermissionError::Unsupported(format!(
                        "permission request failed: {}",
                        e
                    ))),
                };
            let _ = sender.send(Message::PermissionResolved { attempt, result });
        });
    }

    pub(crate) fn handle_permission_resolved(
        &mut self,
        attempt: u64,
        result: Result<(), PermissionError>,
    ) {
        if attempt != self.session.attempt
            || self.session.lifecycle != LifecycleState::AwaitingPermission
        {
            debug!(attempt, current = self.session.attempt, "Dropping stale permission result");
            return;
        }
        self.pending_request = None;

        match result {
            Ok(()) => {
                info!("Camera permission granted");
                self.session.permission = PermissionState::Granted;
                self.transition(
                    LifecycleState::DeviceSelecting,
                    FeedbackMessage::SelectingDevice,
                );
                self.discover_devices(attempt);
            }
            Err(PermissionError::Denied) => {
                warn!("Camera permission denied");
                self.session.permission = PermissionState::Denied;
                self.transition(LifecycleState::Idle, FeedbackMessage::PermissionDenied);
            }
            Err(PermissionError::Unsupported(reason)) => {
                warn!(reason = %reason, "Camera not supported");
                self.transition(LifecycleState::Idle, FeedbackMessage::Unsupported);
            }
        }
    }

    fn discover_devices(&mut self, attempt: u64) {
        let camera = self.camera.clone();
        let sender = self.sender.clone();
        self.spawn_request(async move {
            let result = match tokio::task::spawn_blocking(move || camera.enumerate_devices()).await
            {
                Ok(result) => result,
                Err(e) => Err(BackendError::Crashed(format!("enumeration failed: {}", e))),
            };
            let _ = sender.send(Message::DevicesDiscovered { attempt, result });
        });
    }

    pub(crate) fn handle_devices_discovered(
        &mut self,
        attempt: u64,
        result: BackendResult<Vec<CameraDevice>>,
    ) {
        if attempt != self.session.attempt
            || self.session.lifecycle != LifecycleState::DeviceSelecting
        {
            debug!(attempt, current = self.session.attempt, "Dropping stale device list");
            return;
        }
        self.pending_request = None;

        let devices = match result {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "Camera enumeration failed");
                self.session.available_devices.clear();
                self.session.selected_device = None;
                self.transition(LifecycleState::Idle, FeedbackMessage::EnumerationFailed);
                return;
            }
        };

        let selected = select_device(&devices).cloned();
        info!(
            count = devices.len(),
            selected = ?selected.as_ref().map(|d| d.display_name()),
            "Cameras enumerated"
        );
        self.session.available_devices = devices;

        match selected {
            Some(device) => {
                self.session.selected_device = Some(device);
                self.transition(LifecycleState::Idle, FeedbackMessage::Ready);
            }
            None => {
                self.session.selected_device = None;
                self.transition(LifecycleState::Idle, FeedbackMessage::NoCameraFound);
            }
        }
    }

    /// Cancel the in-flight request and invalidate its attempt
    pub(crate) fn cancel_request(&mut self) {
        if let Some(request) = self.pending_request.take() {
            request.abort();
        }
        self.session.attempt += 1;
    }

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(previous) = self.pending_request.take() {
            previous.abort();
        }
        self.pending_request = Some(tokio::spawn(request).abort_handle());
    }
}
