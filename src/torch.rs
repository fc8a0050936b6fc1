// SPDX-License-Identifier: GPL-3.0-only

//! Torch LED control via Linux sysfs
//!
//! Discovers LEDs exposed at `/sys/class/leds/*:flash` and `*:torch` and drives
//! them through the plain `brightness` file, which is group-writable on most
//! phones, instead of the root-only strobe interface.

use crate::constants::LEDS_SYSFS_DIR;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A torch-capable LED discovered via sysfs
#[derive(Debug, Clone)]
pub struct TorchLed {
    /// Sysfs path, e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    /// Value written for full brightness
    max_brightness: u32,
    /// Directory basename
    name: String,
}

impl TorchLed {
    /// Get the LED name (e.g. "white:flash")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set raw brightness (0 = off), clamped to the LED maximum
    pub fn set_brightness(&self, value: u32) -> io::Result<()> {
        let clamped = value.min(self.max_brightness);
        std::fs::write(self.path.join("brightness"), clamped.to_string())
    }

    pub fn on(&self) -> io::Result<()> {
        self.set_brightness(self.max_brightness)
    }

    pub fn off(&self) -> io::Result<()> {
        self.set_brightness(0)
    }
}

/// Result of torch detection.
///
/// Keeps "hardware exists" apart from "we can drive it" so the reason a torch
/// toggle did nothing can be logged.
#[derive(Debug, Default)]
pub struct TorchHardware {
    /// LEDs we can actually write to
    pub leds: Vec<TorchLed>,
    /// Set when LEDs exist but none is writable
    pub permission_error: Option<String>,
}

impl TorchHardware {
    /// Scan the default sysfs LED class
    pub fn detect() -> Self {
        Self::detect_in(Path::new(LEDS_SYSFS_DIR))
    }

    /// Scan `leds_dir` for torch-capable LEDs
    pub fn detect_in(leds_dir: &Path) -> Self {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            warn!(dir = %leds_dir.display(), "Cannot read LED class, torch disabled");
            return Self::default();
        };

        let mut leds = Vec::new();
        let mut unwritable = Vec::new();

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !is_torch_led(name) {
                continue;
            }

            let led_path = entry.path();
            let Some(max_brightness) = read_max_brightness(&led_path) else {
                continue;
            };

            let brightness_path = led_path.join("brightness");
            match std::fs::OpenOptions::new().write(true).open(&brightness_path) {
                Ok(_) => {
                    info!(name, max_brightness, "Discovered torch LED");
                    leds.push(TorchLed {
                        path: led_path,
                        max_brightness,
                        name: name.to_string(),
                    });
                }
                Err(e) => {
                    warn!(path = %brightness_path.display(), error = %e, "Torch LED not writable");
                    unwritable.push(name.to_string());
                }
            }
        }

        leds.sort_by(|a, b| a.name.cmp(&b.name));

        let permission_error = if leds.is_empty() && !unwritable.is_empty() {
            Some(format!(
                "Torch LEDs found ({}) but not writable; add the user to the group owning their brightness files",
                unwritable.join(", ")
            ))
        } else {
            None
        };

        Self {
            leds,
            permission_error,
        }
    }

    /// Whether any controllable LED was found
    pub fn is_available(&self) -> bool {
        !self.leds.is_empty()
    }

    /// Switch every LED. Returns the first error, after trying all of them.
    pub fn set(&self, enabled: bool) -> io::Result<()> {
        let mut first_error = None;
        for led in &self.leds {
            let result = if enabled { led.on() } else { led.off() };
            if let Err(e) = result {
                warn!(led = %led.name, enabled, error = %e, "Failed to switch torch LED");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn is_torch_led(name: &str) -> bool {
    name.ends_with(":flash") || name.ends_with(":torch")
}

fn read_max_brightness(led_path: &Path) -> Option<u32> {
    let path = led_path.join("max_brightness");
    match std::fs::read_to_string(&path) {
        Ok(s) => match s.trim().parse::<u32>() {
            Ok(v) if v > 0 => Some(v),
            _ => {
                warn!(path = %path.display(), "Invalid max_brightness value");
                None
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read max_brightness");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_led(root: &Path, name: &str, max: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("max_brightness"), max).unwrap();
        std::fs::write(dir.join("brightness"), "0").unwrap();
    }

    #[test]
    fn test_detects_flash_and_torch_leds_only() {
        let root = tempfile::tempdir().unwrap();
        fake_led(root.path(), "white:flash", "255\n");
        fake_led(root.path(), "yellow:torch", "100");
        fake_led(root.path(), "input0::capslock", "1");

        let hardware = TorchHardware::detect_in(root.path());
        let names: Vec<_> = hardware.leds.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["white:flash", "yellow:torch"]);
        assert!(hardware.permission_error.is_none());
    }

    #[test]
    fn test_set_writes_max_brightness_and_zero() {
        let root = tempfile::tempdir().unwrap();
        fake_led(root.path(), "white:flash", "42");

        let hardware = TorchHardware::detect_in(root.path());
        hardware.set(true).unwrap();
        let on = std::fs::read_to_string(root.path().join("white:flash/brightness")).unwrap();
        assert_eq!(on, "42");

        hardware.set(false).unwrap();
        let off = std::fs::read_to_string(root.path().join("white:flash/brightness")).unwrap();
        assert_eq!(off, "0");
    }

    #[test]
    fn test_invalid_max_brightness_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        fake_led(root.path(), "white:flash", "0");

        let hardware = TorchHardware::detect_in(root.path());
        assert!(!hardware.is_available());
    }

    #[test]
    fn test_missing_led_class_yields_no_hardware() {
        let hardware = TorchHardware::detect_in(Path::new("/nonexistent/leds"));
        assert!(!hardware.is_available());
        assert!(hardware.permission_error.is_none());
    }
}
