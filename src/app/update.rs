// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! `update()` routes each message to a handler in the `handlers` submodules:
//!
//! - `handlers::permission`: permission request and device enumeration
//! - `handlers::scan`: preview, decoding, success and teardown
//! - `handlers::torch`: torch toggling
//!
//! After the handler runs, the feedback sink is given the new snapshot if
//! anything observable changed.

use crate::app::SessionController;
use crate::app::feedback::FeedbackMessage;
use crate::app::state::{LifecycleState, Message};
use tracing::{info, info_span};

impl SessionController {
    /// Handle one message
    pub fn update(&mut self, message: Message) {
        let _span = info_span!("session", id = %self.id()).entered();
        let before = self.session.snapshot();

        match message {
            // ===== Commands =====
            Message::Init => self.handle_init(),
            Message::Start => self.handle_start(),
            Message::TriggerScan => self.handle_trigger_scan(),
            Message::Stop => self.handle_stop(),
            Message::ToggleTorch => self.handle_toggle_torch(),

            // ===== Completions =====
            Message::PermissionResolved { attempt, result } => {
                self.handle_permission_resolved(attempt, result)
            }
            Message::DevicesDiscovered { attempt, result } => {
                self.handle_devices_discovered(attempt, result)
            }
            Message::DecodeResult {
                activation,
                decoded,
            } => self.handle_decode_result(activation, decoded),
            Message::DecodeError { activation, error } => {
                self.handle_decode_error(activation, error)
            }
            Message::DecodeHintExpired { activation } => {
                self.handle_decode_hint_expired(activation)
            }
            Message::SuccessTimerElapsed { generation } => {
                self.handle_success_timer_elapsed(generation)
            }
        }

        debug_assert_eq!(self.session.check_invariants(), Ok(()));

        let after = self.session.snapshot();
        if after != before {
            self.feedback.render(&after);
        }
    }

    /// Move to `lifecycle` showing `feedback`
    pub(crate) fn transition(&mut self, lifecycle: LifecycleState, feedback: FeedbackMessage) {
        if self.session.lifecycle != lifecycle {
            info!(
                from = %self.session.lifecycle,
                to = %lifecycle,
                feedback = %feedback,
                "Session transition"
            );
        }
        self.session.lifecycle = lifecycle;
        self.session.feedback = feedback;
    }
}
