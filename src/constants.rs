// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// How long the success feedback stays up before the session closes itself
pub const DEFAULT_SUCCESS_DISPLAY: Duration = Duration::from_millis(2000);

/// How long a frame pull may block before it counts as "no frame yet"
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_millis(2000);

/// Longest single wait on the camera while pulling a frame. The camera lock
/// is released between slices.
pub const FRAME_POLL_SLICE: Duration = Duration::from_millis(20);

/// Pause between frame pulls after a backend failure, so a dead camera
/// does not spin the frame pump
pub const FRAME_RETRY_DELAY: Duration = Duration::from_millis(250);

/// How long "hold steady" stays up after a frame without a barcode
pub const DECODE_HINT_DISPLAY: Duration = Duration::from_millis(1500);

/// Frame interval of the still-image source (~30fps)
pub const STILL_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Frames are downscaled to this maximum dimension before decoding.
/// Barcodes held up to a camera are large enough to survive it.
pub const MAX_DECODE_DIMENSION: u32 = 640;

/// Number of mmap buffers requested from V4L2
pub const CAPTURE_BUFFER_COUNT: u32 = 4;

/// Frames queued between the capture thread and the decoder.
/// Older frames are dropped when the decoder falls behind.
pub const FRAME_QUEUE_DEPTH: usize = 2;

/// Camera resolution constraints handed to the camera backend
pub mod resolution {
    /// Minimum acceptable capture width
    pub const MIN_WIDTH: u32 = 640;
    /// Minimum acceptable capture height
    pub const MIN_HEIGHT: u32 = 480;
    /// Preferred capture width
    pub const IDEAL_WIDTH: u32 = 1280;
    /// Preferred capture height
    pub const IDEAL_HEIGHT: u32 = 720;
}

/// Sound played on a successful scan when none is configured
pub const DEFAULT_SUCCESS_SOUND: &str = "/usr/share/sounds/freedesktop/stereo/complete.oga";

/// Players tried in order for the success cue
pub const SOUND_PLAYERS: [&str; 2] = ["pw-play", "paplay"];

/// Directory name under the user's config dir
pub const CONFIG_DIR_NAME: &str = "barcode-scanner";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// sysfs class holding LED devices
pub const LEDS_SYSFS_DIR: &str = "/sys/class/leds";

/// sysfs class present when the kernel has video4linux support
pub const VIDEO4LINUX_SYSFS_DIR: &str = "/sys/class/video4linux";
