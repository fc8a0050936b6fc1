// SPDX-License-Identifier: GPL-3.0-only

//! Decode engine implementations

pub mod qr_decoder;

pub use qr_decoder::QrDecoder;
