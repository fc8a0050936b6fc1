// SPDX-License-Identifier: GPL-3.0-only

//! Torch handler

use crate::app::SessionController;
use tracing::{debug, info};

impl SessionController {
    /// Flip the torch while the camera is acquired. Devices without a torch
    /// leave the state unchanged.
    pub(crate) fn handle_toggle_torch(&mut self) {
        if !self.session.lifecycle.is_preview_active() {
            debug!(state = %self.session.lifecycle, "Ignoring torch toggle without preview");
            return;
        }

        let enabled = !self.session.torch_enabled;
        match self.camera.set_torch(enabled) {
            Ok(()) => {
                info!(enabled, "Torch toggled");
                self.session.torch_enabled = enabled;
            }
            Err(e) => debug!(error = %e, "Torch toggle ignored"),
        }
    }
}
