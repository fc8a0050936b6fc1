// SPDX-License-Identifier: GPL-3.0-only

//! Session state and messages
//!
//! The [`Session`] is owned by the [`SessionController`](super::SessionController)
//! and only mutated by its handlers. Hosts observe it through
//! [`SessionSnapshot`], a plain value emitted after every change.

use crate::app::feedback::FeedbackMessage;
use crate::app::frame_processor::{BarcodeFormat, Decoded};
use crate::app::timer::SuccessTimer;
use crate::backends::camera::{BackendResult, CameraDevice};
use crate::errors::{DecodeError, PermissionError};
use chrono::{DateTime, Local};

/// Camera permission as far as the session knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// Where the session is in its lifecycle
///
/// Errors do not have a state of their own: a failed attempt returns to
/// `Idle` and reports itself through the feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    AwaitingPermission,
    DeviceSelecting,
    /// Camera acquired, preview showing, decoder not fed
    Previewing,
    /// Frames are being decoded
    ActivelyScanning,
    /// A result was accepted; the session closes when the timer fires
    ShowingSuccess,
}

impl LifecycleState {
    /// Whether the camera is acquired in this state
    pub fn is_preview_active(&self) -> bool {
        matches!(
            self,
            LifecycleState::Previewing
                | LifecycleState::ActivelyScanning
                | LifecycleState::ShowingSuccess
        )
    }

    /// Whether a permission or enumeration request is in flight
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            LifecycleState::AwaitingPermission | LifecycleState::DeviceSelecting
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::AwaitingPermission => "permission",
            LifecycleState::DeviceSelecting => "devices",
            LifecycleState::Previewing => "preview",
            LifecycleState::ActivelyScanning => "scanning",
            LifecycleState::ShowingSuccess => "success",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Messages handled by [`SessionController::update`](super::SessionController::update)
///
/// Commands come from the operator; the rest are completions of asynchronous
/// work, tagged with the token of the request that produced them.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Commands =====
    Init,
    Start,
    TriggerScan,
    Stop,
    ToggleTorch,

    // ===== Completions =====
    PermissionResolved {
        attempt: u64,
        result: Result<(), PermissionError>,
    },
    DevicesDiscovered {
        attempt: u64,
        result: BackendResult<Vec<CameraDevice>>,
    },
    DecodeResult {
        activation: u64,
        decoded: Decoded,
    },
    DecodeError {
        activation: u64,
        error: DecodeError,
    },
    /// The "hold steady" hint of an activation has been up long enough
    DecodeHintExpired {
        activation: u64,
    },
    SuccessTimerElapsed {
        generation: u64,
    },
}

/// The accepted result of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub text: String,
    pub format: BarcodeFormat,
    pub scanned_at: DateTime<Local>,
}

/// Scan session state
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) permission: PermissionState,
    pub(crate) lifecycle: LifecycleState,
    pub(crate) available_devices: Vec<CameraDevice>,
    pub(crate) selected_device: Option<CameraDevice>,
    pub(crate) scanned: Option<ScanRecord>,
    pub(crate) feedback: FeedbackMessage,
    pub(crate) torch_enabled: bool,
    pub(crate) scroll_locked: bool,
    pub(crate) pending_success_timer: Option<SuccessTimer>,
    /// Current permission/enumeration attempt
    pub(crate) attempt: u64,
    /// Current scanning activation
    pub(crate) activation: u64,
    /// Last success timer generation handed out
    pub(crate) timer_generation: u64,
}

impl Session {
    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn available_devices(&self) -> &[CameraDevice] {
        &self.available_devices
    }

    pub fn selected_device(&self) -> Option<&CameraDevice> {
        self.selected_device.as_ref()
    }

    pub fn scanned(&self) -> Option<&ScanRecord> {
        self.scanned.as_ref()
    }

    /// Last accepted payload, kept until the next `start`
    pub fn scanned_result(&self) -> Option<&str> {
        self.scanned.as_ref().map(|record| record.text.as_str())
    }

    pub fn feedback(&self) -> FeedbackMessage {
        self.feedback
    }

    pub fn torch_enabled(&self) -> bool {
        self.torch_enabled
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn has_pending_success_timer(&self) -> bool {
        self.pending_success_timer.is_some()
    }

    pub fn activation(&self) -> u64 {
        self.activation
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Plain-value projection for renderers
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            permission: self.permission,
            lifecycle: self.lifecycle,
            selected_device: self.selected_device.as_ref().map(|d| d.display_name().to_string()),
            scanned_result: self.scanned.as_ref().map(|r| r.text.clone()),
            scanned_format: self.scanned.as_ref().map(|r| r.format),
            feedback: self.feedback,
            torch_enabled: self.torch_enabled,
            scroll_locked: self.scroll_locked,
            success_timer_pending: self.pending_success_timer.is_some(),
        }
    }

    /// Check the structural invariants between the fields
    pub(crate) fn check_invariants(&self) -> Result<(), &'static str> {
        if self.pending_success_timer.is_some() != (self.lifecycle == LifecycleState::ShowingSuccess) {
            return Err("success timer must be pending exactly while showing success");
        }
        if self.lifecycle.is_preview_active() && self.selected_device.is_none() {
            return Err("camera active without a selected device");
        }
        if self.scroll_locked != self.lifecycle.is_preview_active() {
            return Err("scroll lock must follow the preview");
        }
        if self.lifecycle == LifecycleState::ShowingSuccess && self.scanned.is_none() {
            return Err("showing success without a result");
        }
        Ok(())
    }
}

/// Snapshot of the session handed to the feedback sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub permission: PermissionState,
    pub lifecycle: LifecycleState,
    pub selected_device: Option<String>,
    pub scanned_result: Option<String>,
    pub scanned_format: Option<BarcodeFormat>,
    pub feedback: FeedbackMessage,
    pub torch_enabled: bool,
    pub scroll_locked: bool,
    pub success_timer_pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle_and_unknown() {
        let session = Session::default();
        assert_eq!(session.permission(), PermissionState::Unknown);
        assert_eq!(session.lifecycle(), LifecycleState::Idle);
        assert_eq!(session.feedback(), FeedbackMessage::Idle);
        assert!(session.scanned_result().is_none());
        assert_eq!(session.check_invariants(), Ok(()));
    }

    #[test]
    fn test_preview_without_device_breaks_invariants() {
        let session = Session {
            lifecycle: LifecycleState::Previewing,
            scroll_locked: true,
            ..Default::default()
        };
        assert!(session.check_invariants().is_err());
    }

    #[test]
    fn test_preview_active_states() {
        assert!(!LifecycleState::Idle.is_preview_active());
        assert!(!LifecycleState::DeviceSelecting.is_preview_active());
        assert!(LifecycleState::Previewing.is_preview_active());
        assert!(LifecycleState::ActivelyScanning.is_preview_active());
        assert!(LifecycleState::ShowingSuccess.is_preview_active());
    }

    #[test]
    fn test_snapshot_uses_device_label() {
        let session = Session {
            selected_device: Some(CameraDevice::video_input("video0", "Back Camera HD")),
            ..Default::default()
        };
        assert_eq!(
            session.snapshot().selected_device.as_deref(),
            Some("Back Camera HD")
        );
    }
}
