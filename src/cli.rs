// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for barcode scanning
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Running a scan session in the terminal

use barcode_scanner::app::{FeedbackMessage, LifecycleState, SessionController, TerminalFeedback};
use barcode_scanner::backends::audio::SuccessCue;
use barcode_scanner::backends::camera::{
    CameraBackend, CameraBackendManager, FileSourceBackend, V4l2Backend,
};
use barcode_scanner::{AppError, Config, QrDecoder, select_device};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

fn load_config(path: Option<&Path>) -> Result<Config, AppError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// List all available cameras
pub fn list_cameras(config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config.as_deref())?;
    let camera = CameraBackendManager::new(Box::new(V4l2Backend::new()));

    camera.request_access(&config.constraints)?;
    let devices = camera.enumerate_devices()?;

    if devices.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    let preferred = select_device(&devices).map(|device| device.id.clone());

    println!("Available cameras:");
    println!();
    for (index, device) in devices.iter().enumerate() {
        let marker = if preferred.as_deref() == Some(device.id.as_str()) {
            '*'
        } else {
            ' '
        };
        println!(" {}[{}] {}", marker, index, device.display_name());
        println!("      Kind: {}", device.kind.as_str());
        if !device.path.is_empty() {
            println!("      Path: {}", device.path);
        }
    }
    println!();
    println!("* used for scanning");

    Ok(())
}

/// Run one scan session and print the decoded payload to stdout
pub async fn scan(
    images: Vec<PathBuf>,
    auto: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config.as_deref())?;

    let backend: Box<dyn CameraBackend> = if images.is_empty() {
        Box::new(V4l2Backend::new())
    } else {
        info!(count = images.len(), "Scanning still images");
        Box::new(FileSourceBackend::new(images))
    };
    let camera = CameraBackendManager::new(backend);
    let cue = SuccessCue::new(config.success_sound.clone());

    let mut controller = SessionController::new(
        config,
        camera,
        Arc::new(QrDecoder::new()),
        Box::new(TerminalFeedback::new(cue)),
    );

    enable_raw_mode()?;
    let result = run_session(&mut controller, auto).await;
    disable_raw_mode()?;

    let scanned = controller.session().scanned().cloned();
    let feedback = controller.session().feedback();
    controller.destroy();
    result?;

    if let Some(record) = scanned {
        info!(format = %record.format, at = %record.scanned_at, "Scan finished");
        println!("{}", record.text);
        Ok(())
    } else if feedback.is_error() {
        Err(AppError::Other(feedback.to_string()).into())
    } else {
        Ok(())
    }
}

async fn run_session(
    controller: &mut SessionController,
    auto: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut events = EventStream::new();
    let mut auto_triggered = false;

    controller.init();

    loop {
        advance(controller, auto, &mut auto_triggered);
        if is_finished(controller) {
            break;
        }

        tokio::select! {
            message = controller.next_message() => match message {
                Some(message) => controller.update(message),
                None => break,
            },
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key(controller, key);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }

    Ok(())
}

/// Move the session forward without operator input: start once a camera is
/// ready, and with `auto` begin decoding as soon as the preview is up.
fn advance(controller: &mut SessionController, auto: bool, auto_triggered: &mut bool) {
    let session = controller.session();
    match (session.lifecycle(), session.feedback()) {
        (LifecycleState::Idle, FeedbackMessage::Ready) => controller.start(),
        (LifecycleState::Previewing, _) if auto && !*auto_triggered => {
            *auto_triggered = true;
            controller.trigger_scan();
        }
        _ => {}
    }
}

/// The session is over once it is back in idle after closing or failing
fn is_finished(controller: &SessionController) -> bool {
    let session = controller.session();
    session.lifecycle() == LifecycleState::Idle
        && (session.feedback() == FeedbackMessage::Closed || session.feedback().is_error())
}

fn handle_key(controller: &mut SessionController, key: KeyEvent) {
    debug!(code = ?key.code, "Key pressed");
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => controller.stop(),
        KeyCode::Char('q') | KeyCode::Esc => controller.stop(),
        KeyCode::Char(' ') | KeyCode::Enter => controller.trigger_scan(),
        KeyCode::Char('t') => controller.toggle_torch(),
        _ => {}
    }
}
