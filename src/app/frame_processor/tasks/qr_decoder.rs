// SPDX-License-Identifier: GPL-3.0-only

//! QR code decode engine
//!
//! Decodes QR codes with the rqrr crate. Frames are reduced to a packed luma
//! plane and downscaled before detection, which keeps a frame well under a
//! frame interval on modest hardware.

use crate::app::frame_processor::DecodeEngine;
use crate::app::frame_processor::types::{BarcodeFormat, Decoded};
use crate::backends::camera::{CameraFrame, PixelFormat};
use crate::constants::MAX_DECODE_DIMENSION;
use crate::errors::DecodeError;
use tracing::{debug, trace};

/// QR code decoder
pub struct QrDecoder {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDecoder {
    pub fn new() -> Self {
        Self {
            max_dimension: MAX_DECODE_DIMENSION,
        }
    }

    /// Create a decoder with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl DecodeEngine for QrDecoder {
    fn supported_formats(&self) -> &[BarcodeFormat] {
        &[BarcodeFormat::QrCode]
    }

    fn decode(
        &self,
        frame: &CameraFrame,
        allowed: &[BarcodeFormat],
    ) -> Result<Decoded, DecodeError> {
        if !allowed.contains(&BarcodeFormat::QrCode) {
            return Err(DecodeError::FormatNotAllowed);
        }

        let start = std::time::Instant::now();
        let (luma, width, height) = prepare_luma(frame, self.max_dimension);
        if width == 0 || height == 0 {
            return Err(DecodeError::NotFound);
        }

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
            luma[y * width + x]
        });
        let grids = prepared.detect_grids();
        trace!(
            grids = grids.len(),
            width,
            height,
            elapsed_ms = start.elapsed().as_millis(),
            "QR detection complete"
        );

        if grids.is_empty() {
            return Err(DecodeError::NotFound);
        }

        let mut last_error = String::new();
        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => {
                    debug!(
                        content = %content,
                        total_ms = start.elapsed().as_millis(),
                        "Decoded QR code"
                    );
                    return Ok(Decoded::new(content, BarcodeFormat::QrCode));
                }
                Err(e) => {
                    debug!(error = ?e, "Failed to decode QR grid");
                    last_error = format!("{:?}", e);
                }
            }
        }

        Err(DecodeError::Unreadable(last_error))
    }
}

/// Packed luma plane of `frame`, downscaled so neither side exceeds
/// `max_dimension`. Returns the plane and its dimensions.
fn prepare_luma(frame: &CameraFrame, max_dimension: u32) -> (Vec<u8>, usize, usize) {
    let packed = copy_luma_without_stride(frame);
    let width = frame.width;
    let height = frame.height;

    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return (packed, width as usize, height as usize);
    }

    let scale = (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32);
    let new_width = ((width as f32 / scale) as u32).max(1);
    let new_height = ((height as f32 / scale) as u32).max(1);
    let downscaled = downscale_luma(&packed, width, height, new_width, new_height);
    (downscaled, new_width as usize, new_height as usize)
}

/// Copy the luma of each pixel, dropping stride padding.
///
/// RGBA pixels are converted with BT.601 weights.
fn copy_luma_without_stride(frame: &CameraFrame) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let bpp = frame.format.bytes_per_pixel() as usize;

    let mut result = Vec::with_capacity(width * height);

    for y in 0..height {
        let row_start = y * stride;
        let row_end = row_start + width * bpp;
        let Some(row) = frame.data.get(row_start..row_end) else {
            break;
        };
        match frame.format {
            PixelFormat::Gray8 => result.extend_from_slice(row),
            PixelFormat::Rgba8 => result.extend(row.chunks_exact(4).map(|px| {
                let luma = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                luma.round() as u8
            })),
        }
    }

    result
}

/// Downscale a packed luma plane using bilinear interpolation
fn downscale_luma(
    src: &[u8],
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
) -> Vec<u8> {
    let src_width = src_width as usize;
    let src_height = src_height as usize;

    let mut result = Vec::with_capacity((dst_width * dst_height) as usize);

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    let pixel = |px: usize, py: usize| -> f32 { src.get(py * src_width + px).copied().unwrap_or(0) as f32 };

    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x0 = src_x as usize;
            let y0 = src_y as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            let y1 = (y0 + 1).min(src_height - 1);

            let x_frac = src_x - x0 as f32;
            let y_frac = src_y - y0 as f32;

            let value = pixel(x0, y0) * (1.0 - x_frac) * (1.0 - y_frac)
                + pixel(x1, y0) * x_frac * (1.0 - y_frac)
                + pixel(x0, y1) * (1.0 - x_frac) * y_frac
                + pixel(x1, y1) * x_frac * y_frac;

            result.push(value as u8);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn frame(width: u32, height: u32, stride: u32, format: PixelFormat, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            width,
            height,
            data: Arc::from(data),
            format,
            stride,
            captured_at: std::time::Instant::now(),
        }
    }

    #[test]
    fn test_copy_luma_without_stride() {
        // 2x2 greyscale frame with 2 bytes of padding per row
        let data = vec![
            10, 20, 0, 0, //
            30, 40, 0, 0,
        ];
        let result = copy_luma_without_stride(&frame(2, 2, 4, PixelFormat::Gray8, data));
        assert_eq!(result, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_rgba_is_converted_to_luma() {
        let data = vec![
            255, 255, 255, 255, // white
            0, 0, 0, 255, // black
        ];
        let result = copy_luma_without_stride(&frame(2, 1, 8, PixelFormat::Rgba8, data));
        assert_eq!(result, vec![255, 0]);
    }

    #[test]
    fn test_downscale_luma() {
        // 4x2 gradient
        let src = vec![
            0, 85, 170, 255, //
            0, 85, 170, 255,
        ];
        let result = downscale_luma(&src, 4, 2, 2, 1);
        assert_eq!(result.len(), 2);
        // First pixel samples around (0,0), second around (2,0)
        assert!(result[0] < 100);
        assert!(result[1] > 150);
    }

    #[test]
    fn test_prepare_luma_limits_dimensions() {
        let data = vec![128; 1280 * 720];
        let (luma, width, height) =
            prepare_luma(&frame(1280, 720, 1280, PixelFormat::Gray8, data), 640);
        assert_eq!((width, height), (640, 360));
        assert_eq!(luma.len(), 640 * 360);
    }

    #[test]
    fn test_blank_frame_has_no_code() {
        let decoder = QrDecoder::default();
        let blank = CameraFrame::from_gray(64, 64, vec![255; 64 * 64]);
        assert_eq!(
            decoder.decode(&blank, &BarcodeFormat::DEFAULT_ALLOWED),
            Err(DecodeError::NotFound)
        );
    }

    #[test]
    fn test_disallowed_qr_is_rejected() {
        let decoder = QrDecoder::default();
        let blank = CameraFrame::from_gray(8, 8, vec![255; 64]);
        assert_eq!(
            decoder.decode(&blank, &[BarcodeFormat::Code128]),
            Err(DecodeError::FormatNotAllowed)
        );
    }
}
