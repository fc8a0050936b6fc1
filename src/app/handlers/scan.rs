// SPDX-License-Identifier: GPL-3.0-only

//! Scan lifecycle handlers
//!
//! Covers acquiring the camera, toggling the decoder feed, accepting a result
//! and closing the session.

use crate::app::SessionController;
use crate::app::feedback::FeedbackMessage;
use crate::app::frame_processor::{Decoded, FramePump};
use crate::app::state::{LifecycleState, Message, PermissionState, ScanRecord};
use crate::app::timer::{DelayedMessage, SuccessTimer};
use crate::constants::DECODE_HINT_DISPLAY;
use crate::errors::DecodeError;
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

impl SessionController {
    pub(crate) fn handle_start(&mut self) {
        if self.session.lifecycle != LifecycleState::Idle {
            debug!(state = %self.session.lifecycle, "Ignoring start outside idle");
            return;
        }
        self.session.scanned = None;

        let device = match self.session.selected_device.clone() {
            Some(device) if self.session.permission == PermissionState::Granted => device,
            _ => {
                // No usable camera yet: run the whole permission flow again
                self.request_permission();
                return;
            }
        };

        if let Err(e) = self.camera.acquire(&device, &self.config.constraints) {
            warn!(device = %device.display_name(), error = %e, "Failed to acquire camera");
            self.transition(LifecycleState::Idle, FeedbackMessage::CameraUnavailable);
            return;
        }

        self.session.scroll_locked = true;
        self.transition(LifecycleState::Previewing, FeedbackMessage::Framing);
    }

    pub(crate) fn handle_trigger_scan(&mut self) {
        match self.session.lifecycle {
            LifecycleState::Previewing => {
                self.session.activation += 1;
                let activation = self.session.activation;
                self.frame_pump = Some(FramePump::spawn(
                    activation,
                    self.camera.clone(),
                    Arc::clone(&self.decoder),
                    Arc::clone(&self.allowed_formats),
                    self.config.frame_timeout(),
                    self.sender.clone(),
                ));
                self.transition(LifecycleState::ActivelyScanning, FeedbackMessage::Scanning);
            }
            LifecycleState::ActivelyScanning => {
                self.stop_frame_pump();
                self.transition(LifecycleState::Previewing, FeedbackMessage::Framing);
            }
            state => debug!(state = %state, "Ignoring scan trigger"),
        }
    }

    pub(crate) fn handle_decode_result(&mut self, activation: u64, decoded: Decoded) {
        if !self.is_current_activation(activation) {
            debug!(activation, "Dropping stale decode result");
            return;
        }
        if !self.allowed_formats.contains(&decoded.format) {
            debug!(format = %decoded.format, "Dropping decode result in a disallowed format");
            return;
        }

        self.stop_frame_pump();
        info!(format = %decoded.format, text = %decoded.text, "Barcode scanned");
        self.session.scanned = Some(ScanRecord {
            text: decoded.text,
            format: decoded.format,
            scanned_at: Local::now(),
        });
        self.transition(LifecycleState::ShowingSuccess, FeedbackMessage::Success);

        if self.config.success_cue
            && let Err(e) = self.feedback.play_success_cue()
        {
            warn!(error = %e, "Success cue failed");
        }

        self.schedule_success_timer();
    }

    pub(crate) fn handle_decode_error(&mut self, activation: u64, error: DecodeError) {
        if !self.is_current_activation(activation) {
            return;
        }
        trace!(error = %error, "Frame without barcode");
        if self.session.feedback != FeedbackMessage::DecodeFailed {
            self.session.feedback = FeedbackMessage::DecodeFailed;
            self.decode_hint = Some(DelayedMessage::schedule(
                DECODE_HINT_DISPLAY,
                Message::DecodeHintExpired { activation },
                self.sender.clone(),
            ));
        }
    }

    pub(crate) fn handle_decode_hint_expired(&mut self, activation: u64) {
        if !self.is_current_activation(activation) {
            return;
        }
        self.decode_hint = None;
        if self.session.feedback == FeedbackMessage::DecodeFailed {
            self.session.feedback = FeedbackMessage::Scanning;
        }
    }

    pub(crate) fn handle_success_timer_elapsed(&mut self, generation: u64) {
        let pending = self
            .session
            .pending_success_timer
            .as_ref()
            .map(SuccessTimer::generation);
        if self.session.lifecycle != LifecycleState::ShowingSuccess || pending != Some(generation) {
            debug!(generation, ?pending, "Dropping stale success timer");
            return;
        }
        self.close_session();
    }

    pub(crate) fn handle_stop(&mut self) {
        match self.session.lifecycle {
            LifecycleState::Idle => debug!("Stop while idle"),
            LifecycleState::AwaitingPermission | LifecycleState::DeviceSelecting => {
                self.cancel_request();
                self.transition(LifecycleState::Idle, FeedbackMessage::Closed);
            }
            LifecycleState::Previewing
            | LifecycleState::ActivelyScanning
            | LifecycleState::ShowingSuccess => self.close_session(),
        }
    }

    /// Stop decoding, cancel the success timer and release the camera
    pub(crate) fn close_session(&mut self) {
        self.stop_frame_pump();
        self.session.pending_success_timer = None;
        self.shutdown_camera();
        self.session.scroll_locked = false;
        self.transition(LifecycleState::Idle, FeedbackMessage::Closed);
    }

    pub(crate) fn stop_frame_pump(&mut self) {
        self.decode_hint = None;
        if let Some(pump) = self.frame_pump.take() {
            debug!(activation = pump.activation(), "Stopping frame pump");
        }
    }

    fn schedule_success_timer(&mut self) {
        // Replacing the timer drops, and so cancels, any earlier one
        self.session.pending_success_timer = None;
        self.session.timer_generation += 1;
        self.session.pending_success_timer = Some(SuccessTimer::schedule(
            self.session.timer_generation,
            self.config.success_display(),
            self.sender.clone(),
        ));
    }

    fn is_current_activation(&self, activation: u64) -> bool {
        self.session.lifecycle == LifecycleState::ActivelyScanning
            && activation == self.session.activation
    }
}
