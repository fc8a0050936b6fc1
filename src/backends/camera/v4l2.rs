// SPDX-License-Identifier: GPL-3.0-only

//! Native V4L2 camera backend
//!
//! Enumerates `/dev/video*` capture nodes and streams frames from a dedicated
//! capture thread. Frames are reduced to luma before they leave the thread,
//! since the decode engine only looks at brightness.

use super::CameraBackend;
use super::types::*;
use crate::constants::{CAPTURE_BUFFER_COUNT, FRAME_QUEUE_DEPTH, VIDEO4LINUX_SYSFS_DIR};
use crate::errors::PermissionError;
use crate::torch::TorchHardware;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

const YUYV: FourCC = FourCC { repr: *b"YUYV" };
const GREY: FourCC = FourCC { repr: *b"GREY" };
const MJPG: FourCC = FourCC { repr: *b"MJPG" };

/// V4L2 backend
#[derive(Default)]
pub struct V4l2Backend {
    capture: Option<V4l2Capture>,
    /// Detected lazily on the first torch toggle
    torch: Option<TorchHardware>,
    torch_on: bool,
}

impl V4l2Backend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CameraBackend for V4l2Backend {
    fn request_access(&mut self, constraints: &CameraConstraints) -> Result<(), PermissionError> {
        if !Path::new(VIDEO4LINUX_SYSFS_DIR).exists() {
            return Err(PermissionError::Unsupported(
                "kernel has no video4linux support".to_string(),
            ));
        }

        debug!(ideal = %constraints.ideal, "Probing V4L2 device permissions");

        let nodes = v4l::context::enum_devices();
        let mut denied = false;
        for node in &nodes {
            match std::fs::File::open(node.path()) {
                Ok(_) => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    debug!(path = %node.path().display(), "Permission denied on video node");
                    denied = true;
                }
                Err(e) => {
                    debug!(path = %node.path().display(), error = %e, "Cannot open video node");
                }
            }
        }

        // No nodes at all is not a permission problem; enumeration reports it
        if denied {
            Err(PermissionError::Denied)
        } else {
            Ok(())
        }
    }

    fn enumerate_devices(&mut self) -> BackendResult<Vec<CameraDevice>> {
        let mut nodes = v4l::context::enum_devices();
        nodes.sort_by_key(|node| node.index());

        let devices = nodes
            .iter()
            .map(|node| {
                let path = node.path().to_string_lossy().to_string();
                let sysfs_name = node.name().unwrap_or_default();

                // Metadata nodes of UVC cameras show up as /dev/videoN too
                let (kind, label) = match Device::with_path(node.path()).and_then(|d| d.query_caps()) {
                    Ok(caps) => {
                        let kind = if caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                            DeviceKind::VideoInput
                        } else {
                            DeviceKind::Other
                        };
                        let label = if sysfs_name.is_empty() { caps.card } else { sysfs_name };
                        (kind, label)
                    }
                    Err(e) => {
                        debug!(path = %path, error = %e, "Cannot query capabilities");
                        (DeviceKind::VideoInput, sysfs_name)
                    }
                };

                CameraDevice {
                    id: format!("video{}", node.index()),
                    label,
                    kind,
                    path,
                }
            })
            .collect();

        Ok(devices)
    }

    fn acquire(
        &mut self,
        device: &CameraDevice,
        constraints: &CameraConstraints,
    ) -> BackendResult<()> {
        if self.capture.is_some() {
            return Err(BackendError::DeviceBusy);
        }
        self.capture = Some(V4l2Capture::start(&device.path, constraints)?);
        Ok(())
    }

    fn release(&mut self) {
        if self.torch_on {
            if let Some(torch) = &self.torch {
                let _ = torch.set(false);
            }
            self.torch_on = false;
        }
        if let Some(capture) = self.capture.take() {
            capture.stop();
        }
    }

    fn is_acquired(&self) -> bool {
        self.capture.is_some()
    }

    fn next_frame(&mut self, timeout: Duration) -> BackendResult<CameraFrame> {
        let capture = self.capture.as_ref().ok_or(BackendError::NotAcquired)?;
        match capture.frames.recv_timeout(timeout) {
            Ok(frame) => Ok(frame),
            Err(RecvTimeoutError::Timeout) => Err(BackendError::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                Err(BackendError::Crashed("capture thread exited".to_string()))
            }
        }
    }

    fn set_torch(&mut self, enabled: bool) -> BackendResult<()> {
        let torch = self.torch.get_or_insert_with(TorchHardware::detect);
        if !torch.is_available() {
            if let Some(reason) = &torch.permission_error {
                debug!(reason = %reason, "Torch unavailable");
            }
            return Err(BackendError::TorchUnsupported);
        }
        torch.set(enabled)?;
        self.torch_on = enabled;
        Ok(())
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }
}

/// Running capture: a thread pushing frames into a bounded queue
struct V4l2Capture {
    frames: Receiver<CameraFrame>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl V4l2Capture {
    fn start(path: &str, constraints: &CameraConstraints) -> BackendResult<Self> {
        info!(path, ideal = %constraints.ideal, "Opening V4L2 device");

        let dev = Device::with_path(path)
            .map_err(|e| BackendError::InitializationFailed(format!("{}: {}", path, e)))?;

        let format = negotiate_format(&dev, constraints)?;

        let (sender, frames) = std::sync::mpsc::sync_channel(FRAME_QUEUE_DEPTH);
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = Arc::clone(&running);
        let path_clone = path.to_string();

        let thread_handle = std::thread::Builder::new()
            .name("v4l2-capture".to_string())
            .spawn(move || {
                if let Err(e) = capture_loop(dev, format, sender, running_clone) {
                    error!(path = %path_clone, error = %e, "V4L2 capture loop failed");
                }
            })
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        Ok(Self {
            frames,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            match handle.join() {
                Ok(()) => info!("V4L2 capture thread stopped"),
                Err(_) => warn!("V4L2 capture thread panicked"),
            }
        }
    }
}

impl Drop for V4l2Capture {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Ask for YUYV at the ideal resolution and take whatever the driver settles on
fn negotiate_format(dev: &Device, constraints: &CameraConstraints) -> BackendResult<Format> {
    let requested = Format::new(constraints.ideal.width, constraints.ideal.height, YUYV);
    let format = match dev.set_format(&requested) {
        Ok(format) => format,
        Err(e) => {
            warn!(error = %e, "Could not set format, using current device format");
            dev.format()
                .map_err(|e| BackendError::InitializationFailed(e.to_string()))?
        }
    };

    let actual = Resolution::new(format.width, format.height);
    info!(resolution = %actual, fourcc = %format.fourcc, "Negotiated V4L2 format");
    if !actual.covers(&constraints.min) {
        warn!(resolution = %actual, min = %constraints.min, "Device resolution below minimum");
    }

    if ![YUYV, GREY, MJPG].contains(&format.fourcc) {
        return Err(BackendError::InitializationFailed(format!(
            "unsupported pixel format {}",
            format.fourcc
        )));
    }
    Ok(format)
}

/// Main capture loop running in a separate thread
fn capture_loop(
    dev: Device,
    format: Format,
    sender: SyncSender<CameraFrame>,
    running: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut stream = MmapStream::with_buffers(&dev, Type::VideoCapture, CAPTURE_BUFFER_COUNT)
        .map_err(|e| format!("Failed to create buffer stream: {}", e))?;

    info!("V4L2 capture stream started");

    while running.load(Ordering::SeqCst) {
        let (buf, _meta) = stream.next()?;
        let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

        let Some(frame) = to_luma_frame(buf, &format) else {
            if frame_num % 30 == 0 {
                warn!(frame = frame_num, len = buf.len(), "Dropping malformed frame");
            }
            continue;
        };

        match sender.try_send(frame) {
            Ok(()) => trace!(frame = frame_num, "Queued frame"),
            // Decoder is busy; it will get a fresher frame next time
            Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => break,
        }
    }

    Ok(())
}

/// Reduce a raw V4L2 buffer to a tightly packed luma frame
fn to_luma_frame(buf: &[u8], format: &Format) -> Option<CameraFrame> {
    if format.fourcc == MJPG {
        let decoded = image::load_from_memory_with_format(buf, image::ImageFormat::Jpeg).ok()?;
        let gray = decoded.to_luma8();
        return Some(CameraFrame::from_gray(gray.width(), gray.height(), gray.into_raw()));
    }

    let width = format.width as usize;
    let height = format.height as usize;
    if width == 0 || height == 0 {
        return None;
    }

    // Bytes per pixel in the raw buffer; luma is the first byte of each pixel
    let step = if format.fourcc == YUYV {
        2
    } else if format.fourcc == GREY {
        1
    } else {
        return None;
    };

    let row_len = width * step;
    let stride = (format.stride as usize).max(row_len);
    if buf.len() < stride * (height - 1) + row_len {
        return None;
    }

    let mut luma = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = &buf[y * stride..y * stride + row_len];
        luma.extend(row.iter().step_by(step));
    }

    Some(CameraFrame::from_gray(format.width, format.height, luma))
}
