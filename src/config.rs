// SPDX-License-Identifier: GPL-3.0-only

use crate::app::frame_processor::BarcodeFormat;
use crate::backends::camera::CameraConstraints;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_FRAME_TIMEOUT, DEFAULT_SUCCESS_DISPLAY,
};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Scanner configuration
///
/// Stored as JSON in the user config directory. Missing fields take their
/// defaults, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Formats the decoder may report
    pub allowed_formats: Vec<BarcodeFormat>,
    /// Capture constraints passed to the camera backend
    pub constraints: CameraConstraints,
    /// How long the success feedback stays up before the session closes
    pub success_display_ms: u64,
    /// Play the audible cue on success
    pub success_cue: bool,
    /// Sound file for the cue (system default when unset)
    pub success_sound: Option<PathBuf>,
    /// How long a frame pull may wait before retrying
    pub frame_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_formats: BarcodeFormat::DEFAULT_ALLOWED.to_vec(),
            constraints: CameraConstraints::default(),
            success_display_ms: DEFAULT_SUCCESS_DISPLAY.as_millis() as u64,
            success_cue: true,
            success_sound: None,
            frame_timeout_ms: DEFAULT_FRAME_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults when no
    /// config file exists
    pub fn load() -> AppResult<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_durations() {
        let config = Config::default();
        assert_eq!(config.success_display(), DEFAULT_SUCCESS_DISPLAY);
        assert_eq!(config.frame_timeout(), DEFAULT_FRAME_TIMEOUT);
    }

    #[test]
    fn test_path_ends_with_file_name() {
        if let Some(path) = Config::path() {
            assert!(path.ends_with(Path::new(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)));
        }
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let result: Result<Config, _> = serde_json::from_str(r#"{ "allowed_formats": ["PDF417"] }"#);
        assert!(result.is_err());
    }
}
