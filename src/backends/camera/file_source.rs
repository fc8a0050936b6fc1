// SPDX-License-Identifier: GPL-3.0-only

//! Still-image camera backend
//!
//! Each image file is presented as its own video input device that delivers
//! the same greyscale frame at a steady rate. Lets the scanner run on
//! machines without a camera and on recorded material.

use super::CameraBackend;
use super::types::*;
use crate::constants::STILL_FRAME_INTERVAL;
use crate::errors::PermissionError;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Backend serving frames from image files
pub struct FileSourceBackend {
    paths: Vec<PathBuf>,
    frame_interval: Duration,
    active: Option<CameraFrame>,
    /// When the next frame is delivered
    next_due: Instant,
}

impl FileSourceBackend {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            frame_interval: STILL_FRAME_INTERVAL,
            active: None,
            next_due: Instant::now(),
        }
    }

    /// Override the simulated frame interval
    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }
}

impl CameraBackend for FileSourceBackend {
    fn request_access(&mut self, _constraints: &CameraConstraints) -> Result<(), PermissionError> {
        for path in &self.paths {
            if let Err(e) = std::fs::File::open(path) {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    return Err(PermissionError::Denied);
                }
                // Missing files surface when the device is acquired
                debug!(path = %path.display(), error = %e, "Image not readable");
            }
        }
        Ok(())
    }

    fn enumerate_devices(&mut self) -> BackendResult<Vec<CameraDevice>> {
        Ok(self
            .paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let label = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                CameraDevice::video_input(format!("image{}", index), label)
                    .with_path(path.to_string_lossy())
            })
            .collect())
    }

    fn acquire(
        &mut self,
        device: &CameraDevice,
        _constraints: &CameraConstraints,
    ) -> BackendResult<()> {
        if self.active.is_some() {
            return Err(BackendError::DeviceBusy);
        }

        let image = image::open(&device.path).map_err(|e| {
            BackendError::InitializationFailed(format!("{}: {}", device.path, e))
        })?;
        let gray = image.to_luma8();
        info!(
            path = %device.path,
            width = gray.width(),
            height = gray.height(),
            "Loaded still image source"
        );

        self.next_due = Instant::now() + self.frame_interval;
        self.active = Some(CameraFrame::from_gray(
            gray.width(),
            gray.height(),
            gray.into_raw(),
        ));
        Ok(())
    }

    fn release(&mut self) {
        self.active = None;
    }

    fn is_acquired(&self) -> bool {
        self.active.is_some()
    }

    fn next_frame(&mut self, timeout: Duration) -> BackendResult<CameraFrame> {
        let frame = self.active.as_ref().ok_or(BackendError::NotAcquired)?;
        let wait = self.next_due.saturating_duration_since(Instant::now());
        if wait > timeout {
            std::thread::sleep(timeout);
            return Err(BackendError::Timeout);
        }
        std::thread::sleep(wait);
        self.next_due = Instant::now() + self.frame_interval;
        Ok(frame.recaptured())
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::StillImage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn write_image(dir: &std::path::Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = GrayImage::from_fn(4, 3, |x, _| Luma([(x * 60) as u8]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_each_file_is_a_video_input() {
        let mut backend = FileSourceBackend::new(vec![
            PathBuf::from("/tmp/front.png"),
            PathBuf::from("/tmp/back.png"),
        ]);
        let devices = backend.enumerate_devices().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].label, "back.png");
        assert_eq!(devices[1].kind, DeviceKind::VideoInput);
        assert_eq!(devices[1].path, "/tmp/back.png");
    }

    #[test]
    fn test_acquire_delivers_greyscale_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "code.png");
        let mut backend =
            FileSourceBackend::new(vec![path]).with_frame_interval(Duration::from_millis(1));

        let device = backend.enumerate_devices().unwrap().remove(0);
        backend
            .acquire(&device, &CameraConstraints::default())
            .unwrap();
        assert!(backend.is_acquired());

        let frame = backend.next_frame(Duration::from_millis(50)).unwrap();
        assert_eq!((frame.width, frame.height), (4, 3));
        assert_eq!(frame.format, PixelFormat::Gray8);
        assert_eq!(frame.data[1], 60);

        backend.release();
        assert!(matches!(
            backend.next_frame(Duration::from_millis(50)),
            Err(BackendError::NotAcquired)
        ));
    }

    #[test]
    fn test_short_polls_reach_the_next_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "code.png");
        let mut backend =
            FileSourceBackend::new(vec![path]).with_frame_interval(Duration::from_millis(30));
        let device = backend.enumerate_devices().unwrap().remove(0);
        backend
            .acquire(&device, &CameraConstraints::default())
            .unwrap();

        let mut timeouts = 0;
        let frame = loop {
            match backend.next_frame(Duration::from_millis(5)) {
                Ok(frame) => break frame,
                Err(BackendError::Timeout) => timeouts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
            assert!(timeouts < 100, "no frame delivered");
        };
        assert!(timeouts > 0);
        assert_eq!((frame.width, frame.height), (4, 3));
    }

    #[test]
    fn test_acquire_missing_file_fails() {
        let mut backend = FileSourceBackend::new(vec![PathBuf::from("/nonexistent/code.png")]);
        let device = backend.enumerate_devices().unwrap().remove(0);
        let result = backend.acquire(&device, &CameraConstraints::default());
        assert!(matches!(result, Err(BackendError::InitializationFailed(_))));
        assert!(!backend.is_acquired());
    }
}
