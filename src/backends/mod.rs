// SPDX-License-Identifier: GPL-3.0-only

//! Hardware collaborators of the scan session
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              SessionController              │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                  │
//! │  ┌─────────────┐    ┌──────────────────┐    │
//! │  │    Audio    │    │     Camera       │    │
//! │  │ (cue sound) │    │ (V4L2 / images)  │    │
//! │  └─────────────┘    └──────────────────┘    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`audio`]: Success cue playback
//! - [`camera`]: Camera permission, enumeration, acquisition and frames

pub mod audio;
pub mod camera;
