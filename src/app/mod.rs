// SPDX-License-Identifier: GPL-3.0-only

//! Scan session controller
//!
//! The controller owns one [`Session`] and drives it through the scan
//! lifecycle:
//!
//! ```text
//! Idle -> AwaitingPermission -> DeviceSelecting -> Idle (device ready)
//! Idle -> Previewing <-> ActivelyScanning -> ShowingSuccess -> Idle
//! ```
//!
//! Commands and completions of background work are both [`Message`]s,
//! handled one at a time by [`SessionController::update`]. Background work
//! (permission, enumeration, frame decoding, the success timer) runs on tokio
//! tasks that post their completion back on the controller's channel; the
//! host pumps that channel with [`SessionController::process_next`].
//!
//! Completions carry the attempt, activation or timer generation they were
//! started under and are dropped when that token is no longer current.

pub mod feedback;
pub mod frame_processor;
mod handlers;
pub mod selector;
pub mod state;
pub mod timer;
mod update;

pub use feedback::{FeedbackMessage, FeedbackSink, TerminalFeedback};
pub use frame_processor::{BarcodeFormat, DecodeEngine, Decoded, QrDecoder};
pub use selector::select_device;
pub use state::{
    LifecycleState, Message, PermissionState, ScanRecord, Session, SessionSnapshot,
};

use crate::backends::camera::{BackendResult, CameraBackendManager, CameraDevice};
use crate::config::Config;
use crate::errors::{DecodeError, PermissionError};
use frame_processor::FramePump;
use timer::DelayedMessage;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::info;
use uuid::Uuid;

/// Drives a single scan session
pub struct SessionController {
    /// Identifies this controller in logs
    id: Uuid,
    pub(crate) session: Session,
    pub(crate) config: Config,
    pub(crate) camera: CameraBackendManager,
    pub(crate) decoder: Arc<dyn DecodeEngine>,
    pub(crate) allowed_formats: Arc<[BarcodeFormat]>,
    pub(crate) feedback: Box<dyn FeedbackSink>,
    pub(crate) sender: UnboundedSender<Message>,
    receiver: UnboundedReceiver<Message>,
    /// In-flight permission or enumeration request
    pub(crate) pending_request: Option<AbortHandle>,
    /// Decoder feed while actively scanning
    pub(crate) frame_pump: Option<FramePump>,
    /// Pending reset of the "hold steady" hint
    pub(crate) decode_hint: Option<DelayedMessage>,
}

impl SessionController {
    pub fn new(
        config: Config,
        camera: CameraBackendManager,
        decoder: Arc<dyn DecodeEngine>,
        feedback: Box<dyn FeedbackSink>,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        let allowed_formats: Arc<[BarcodeFormat]> = Arc::from(config.allowed_formats.clone());

        info!(
            session = %id,
            backend = %camera.backend_type(),
            formats = ?allowed_formats,
            "Creating scan session"
        );

        Self {
            id,
            session: Session::default(),
            config,
            camera,
            decoder,
            allowed_formats,
            feedback,
            sender,
            receiver,
            pending_request: None,
            frame_pump: None,
            decode_hint: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ===== Commands =====

    /// Request permission and select a camera
    pub fn init(&mut self) {
        self.update(Message::Init);
    }

    /// Acquire the selected camera and show the preview
    pub fn start(&mut self) {
        self.update(Message::Start);
    }

    /// Start or pause decoding while the preview is showing
    pub fn trigger_scan(&mut self) {
        self.update(Message::TriggerScan);
    }

    /// Close the session and release the camera
    pub fn stop(&mut self) {
        self.update(Message::Stop);
    }

    pub fn toggle_torch(&mut self) {
        self.update(Message::ToggleTorch);
    }

    // ===== Completions =====
    //
    // These report against the current attempt or activation. Background
    // tasks post tagged messages instead, so late results can be told apart.

    pub fn on_permission_resolved(&mut self, result: Result<(), PermissionError>) {
        let attempt = self.session.attempt;
        self.update(Message::PermissionResolved { attempt, result });
    }

    pub fn on_devices_discovered(&mut self, result: BackendResult<Vec<CameraDevice>>) {
        let attempt = self.session.attempt;
        self.update(Message::DevicesDiscovered { attempt, result });
    }

    pub fn on_decode_result(&mut self, decoded: Decoded) {
        let activation = self.session.activation;
        self.update(Message::DecodeResult {
            activation,
            decoded,
        });
    }

    pub fn on_decode_error(&mut self, error: DecodeError) {
        let activation = self.session.activation;
        self.update(Message::DecodeError { activation, error });
    }

    // ===== Event loop =====

    /// Wait for the next completion from background work
    ///
    /// The controller holds a sender itself, so this only returns `None`
    /// if the channel is closed from the receiving side.
    pub async fn next_message(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Wait for one completion and handle it
    pub async fn process_next(&mut self) -> bool {
        match self.next_message().await {
            Some(message) => {
                self.update(message);
                true
            }
            None => false,
        }
    }

    /// Tear the session down: cancel all background work and release the camera
    pub fn destroy(self) {
        drop(self);
    }

    fn teardown(&mut self) {
        if let Some(request) = self.pending_request.take() {
            request.abort();
        }
        self.stop_frame_pump();
        self.session.pending_success_timer = None;
        self.shutdown_camera();
    }

    /// Turn the torch off and release the camera
    pub(crate) fn shutdown_camera(&mut self) {
        if self.session.torch_enabled {
            if let Err(e) = self.camera.set_torch(false) {
                tracing::debug!(session = %self.id, error = %e, "Torch off failed during release");
            }
            self.session.torch_enabled = false;
        }
        self.camera.release();
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        info!(session = %self.id, "Destroying scan session");
        self.teardown();
    }
}
