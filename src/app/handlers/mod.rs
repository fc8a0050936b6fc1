// SPDX-License-Identifier: GPL-3.0-only

//! Message handler modules
//!
//! Handlers are grouped by the part of the lifecycle they drive.

mod permission;
mod scan;
mod torch;
