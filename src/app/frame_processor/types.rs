// SPDX-License-Identifier: GPL-3.0-only

//! Core types for frame decoding results

use serde::{Deserialize, Serialize};

/// Barcode symbology
///
/// The session hands the decode engine the set of formats it may report;
/// anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarcodeFormat {
    /// QR code (2D)
    QrCode,
    /// Code 128 (linear)
    Code128,
    /// EAN-13 (linear)
    Ean13,
    /// EAN-8 (linear)
    Ean8,
    /// UPC-A (linear)
    UpcA,
    /// Data Matrix (2D)
    DataMatrix,
}

impl BarcodeFormat {
    /// Get all formats for iteration
    pub const ALL: [BarcodeFormat; 6] = [
        BarcodeFormat::QrCode,
        BarcodeFormat::Code128,
        BarcodeFormat::Ean13,
        BarcodeFormat::Ean8,
        BarcodeFormat::UpcA,
        BarcodeFormat::DataMatrix,
    ];

    /// Formats accepted when nothing is configured
    pub const DEFAULT_ALLOWED: [BarcodeFormat; 2] = [BarcodeFormat::QrCode, BarcodeFormat::Code128];

    /// Get display name for the format
    pub fn display_name(&self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "QR Code",
            BarcodeFormat::Code128 => "Code 128",
            BarcodeFormat::Ean13 => "EAN-13",
            BarcodeFormat::Ean8 => "EAN-8",
            BarcodeFormat::UpcA => "UPC-A",
            BarcodeFormat::DataMatrix => "Data Matrix",
        }
    }

    /// Whether the symbology is two-dimensional
    pub fn is_2d(&self) -> bool {
        matches!(self, BarcodeFormat::QrCode | BarcodeFormat::DataMatrix)
    }
}

impl std::fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A successfully decoded barcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded payload
    pub text: String,
    /// Format the engine matched
    pub format: BarcodeFormat,
}

impl Decoded {
    pub fn new(text: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }
}
