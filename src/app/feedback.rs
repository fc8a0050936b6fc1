// SPDX-License-Identifier: GPL-3.0-only

//! Operator feedback
//!
//! Every lifecycle change carries a [`FeedbackMessage`] describing what the
//! operator should see. A [`FeedbackSink`] renders session snapshots and plays
//! the success cue; [`TerminalFeedback`] is the terminal implementation used
//! by the CLI.

use crate::app::state::SessionSnapshot;
use crate::backends::audio::SuccessCue;
use crate::errors::CueError;
use crossterm::{
    cursor, queue,
    style::{Print, Stylize},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use tracing::warn;

/// Operator-facing status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackMessage {
    #[default]
    Idle,
    RequestingPermission,
    SelectingDevice,
    Ready,
    PermissionDenied,
    Unsupported,
    NoCameraFound,
    EnumerationFailed,
    CameraUnavailable,
    Framing,
    Scanning,
    DecodeFailed,
    Success,
    Closed,
}

impl FeedbackMessage {
    pub fn text(&self) -> &'static str {
        match self {
            FeedbackMessage::Idle => "Press start to scan",
            FeedbackMessage::RequestingPermission => "Requesting camera access…",
            FeedbackMessage::SelectingDevice => "Looking for cameras…",
            FeedbackMessage::Ready => "Ready to scan",
            FeedbackMessage::PermissionDenied => "Permission denied",
            FeedbackMessage::Unsupported => "Camera not supported on this system",
            FeedbackMessage::NoCameraFound => "No camera found",
            FeedbackMessage::EnumerationFailed => "Could not list cameras",
            FeedbackMessage::CameraUnavailable => "Camera unavailable",
            FeedbackMessage::Framing => "Align the barcode inside the frame",
            FeedbackMessage::Scanning => "Scanning…",
            FeedbackMessage::DecodeFailed => "No barcode detected, hold steady",
            FeedbackMessage::Success => "Scan complete",
            FeedbackMessage::Closed => "Scanner closed",
        }
    }

    /// Whether the message reports a failed attempt
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            FeedbackMessage::PermissionDenied
                | FeedbackMessage::Unsupported
                | FeedbackMessage::NoCameraFound
                | FeedbackMessage::EnumerationFailed
                | FeedbackMessage::CameraUnavailable
        )
    }
}

impl std::fmt::Display for FeedbackMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Where session feedback goes
pub trait FeedbackSink: Send {
    /// Called with the new snapshot after every state change
    fn render(&mut self, snapshot: &SessionSnapshot);

    /// Play the audible success cue
    fn play_success_cue(&mut self) -> Result<(), CueError>;
}

/// Renders the session as a single status line on stderr
///
/// While the preview is active (scroll locked) the line is redrawn in place;
/// otherwise each change is printed on its own line.
pub struct TerminalFeedback {
    cue: SuccessCue,
    redrawing: bool,
}

impl TerminalFeedback {
    pub fn new(cue: SuccessCue) -> Self {
        Self {
            cue,
            redrawing: false,
        }
    }

    fn draw(&mut self, snapshot: &SessionSnapshot) -> io::Result<()> {
        let line = status_line(snapshot);
        let mut err = io::stderr();

        if snapshot.scroll_locked {
            queue!(
                err,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(line)
            )?;
        } else {
            if self.redrawing {
                queue!(err, Print("\r\n"))?;
            }
            queue!(err, Print(line), Print("\r\n"))?;
        }
        self.redrawing = snapshot.scroll_locked;
        err.flush()
    }
}

impl FeedbackSink for TerminalFeedback {
    fn render(&mut self, snapshot: &SessionSnapshot) {
        if let Err(e) = self.draw(snapshot) {
            warn!(error = %e, "Failed to draw status line");
        }
    }

    fn play_success_cue(&mut self) -> Result<(), CueError> {
        self.cue.play()
    }
}

fn status_line(snapshot: &SessionSnapshot) -> String {
    let mut line = format!("[{}] ", snapshot.lifecycle);

    let message = snapshot.feedback.text();
    if snapshot.feedback.is_error() {
        line.push_str(&message.red().to_string());
    } else if snapshot.success_timer_pending {
        line.push_str(&message.green().to_string());
    } else {
        line.push_str(message);
    }

    if let Some(device) = &snapshot.selected_device
        && snapshot.scroll_locked
    {
        line.push_str(&format!("  ({})", device));
    }
    if snapshot.torch_enabled {
        line.push_str("  torch on");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{LifecycleState, PermissionState};

    fn snapshot(feedback: FeedbackMessage) -> SessionSnapshot {
        SessionSnapshot {
            permission: PermissionState::Granted,
            lifecycle: LifecycleState::Previewing,
            selected_device: Some("Back Camera".to_string()),
            scanned_result: None,
            scanned_format: None,
            feedback,
            torch_enabled: true,
            scroll_locked: true,
            success_timer_pending: false,
        }
    }

    #[test]
    fn test_error_messages() {
        assert!(FeedbackMessage::PermissionDenied.is_error());
        assert!(FeedbackMessage::CameraUnavailable.is_error());
        assert!(!FeedbackMessage::DecodeFailed.is_error());
        assert!(!FeedbackMessage::Closed.is_error());
    }

    #[test]
    fn test_message_text() {
        assert_eq!(FeedbackMessage::Ready.to_string(), "Ready to scan");
        assert_eq!(FeedbackMessage::Closed.to_string(), "Scanner closed");
    }

    #[test]
    fn test_status_line_contents() {
        let line = status_line(&snapshot(FeedbackMessage::Framing));
        assert!(line.starts_with("[preview] "));
        assert!(line.contains("Align the barcode inside the frame"));
        assert!(line.contains("Back Camera"));
        assert!(line.contains("torch on"));
    }
}
