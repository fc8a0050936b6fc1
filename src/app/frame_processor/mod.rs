// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor module for async frame decoding
//!
//! While the session is actively scanning, a frame pump pulls frames from the
//! acquired camera and runs the decode engine on them. Both steps block, so
//! they run on tokio's blocking pool; outcomes come back to the controller as
//! messages tagged with the scanning activation that produced them.

pub mod tasks;
pub mod types;

pub use tasks::QrDecoder;
pub use types::{BarcodeFormat, Decoded};

use crate::app::state::Message;
use crate::backends::camera::{BackendError, CameraBackendManager, CameraFrame};
use crate::constants::FRAME_RETRY_DELAY;
use crate::errors::DecodeError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tracing::{debug, trace, warn};

/// Barcode decode engine
///
/// Implementations may block; they are only called from the blocking pool.
pub trait DecodeEngine: Send + Sync {
    /// Formats this engine is able to decode
    fn supported_formats(&self) -> &[BarcodeFormat];

    /// Decode a single frame, reporting only formats in `allowed`
    fn decode(&self, frame: &CameraFrame, allowed: &[BarcodeFormat])
    -> Result<Decoded, DecodeError>;
}

/// Outcome of one pull-and-decode round
enum PumpStep {
    Decoded(Result<Decoded, DecodeError>),
    NoFrame,
    CameraFailed(BackendError),
    Cancelled,
}

/// Frame pump feeding one scanning activation
///
/// Dropping the pump stops it: the async loop is aborted and any blocking
/// round still in flight discards its outcome.
pub(crate) struct FramePump {
    activation: u64,
    cancelled: Arc<AtomicBool>,
    handle: AbortHandle,
}

impl FramePump {
    pub(crate) fn spawn(
        activation: u64,
        camera: CameraBackendManager,
        engine: Arc<dyn DecodeEngine>,
        allowed: Arc<[BarcodeFormat]>,
        frame_timeout: Duration,
        sender: UnboundedSender<Message>,
    ) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancelled);

        let task = tokio::spawn(async move {
            debug!(activation, "Frame pump started");
            loop {
                let camera = camera.clone();
                let engine = Arc::clone(&engine);
                let allowed = Arc::clone(&allowed);
                let cancel_flag = Arc::clone(&cancel_flag);

                let step = tokio::task::spawn_blocking(move || {
                    if cancel_flag.load(Ordering::Acquire) {
                        return PumpStep::Cancelled;
                    }
                    let step = match camera.next_frame(frame_timeout, &cancel_flag) {
                        Ok(frame) => PumpStep::Decoded(engine.decode(&frame, &allowed)),
                        Err(BackendError::Timeout) => PumpStep::NoFrame,
                        Err(e) => PumpStep::CameraFailed(e),
                    };
                    if cancel_flag.load(Ordering::Acquire) {
                        PumpStep::Cancelled
                    } else {
                        step
                    }
                })
                .await;

                let message = match step {
                    Ok(PumpStep::Decoded(Ok(decoded))) => Message::DecodeResult { activation, decoded },
                    Ok(PumpStep::Decoded(Err(error))) => {
                        trace!(activation, error = %error, "Frame not decoded");
                        Message::DecodeError { activation, error }
                    }
                    Ok(PumpStep::NoFrame) => continue,
                    Ok(PumpStep::CameraFailed(e)) => {
                        warn!(activation, error = %e, "Frame pull failed");
                        tokio::time::sleep(FRAME_RETRY_DELAY).await;
                        continue;
                    }
                    Ok(PumpStep::Cancelled) => break,
                    Err(e) => {
                        warn!(activation, error = %e, "Frame decode task panicked");
                        break;
                    }
                };

                if sender.send(message).is_err() {
                    break;
                }
            }
            debug!(activation, "Frame pump finished");
        });

        Self {
            activation,
            cancelled,
            handle: task.abort_handle(),
        }
    }

    pub(crate) fn activation(&self) -> u64 {
        self.activation
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.handle.abort();
    }
}
