// SPDX-License-Identifier: GPL-3.0-only

//! Success cue playback
//!
//! Plays a short sound through PipeWire (`pw-play`) or PulseAudio (`paplay`),
//! falling back to the terminal bell. Playback is fire-and-forget: the player
//! process is reaped on a helper thread so the caller never waits on audio.

use crate::constants::{DEFAULT_SUCCESS_SOUND, SOUND_PLAYERS};
use crate::errors::CueError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Plays the "scan succeeded" sound
#[derive(Debug, Clone)]
pub struct SuccessCue {
    sound: PathBuf,
}

impl Default for SuccessCue {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SuccessCue {
    /// Create a cue for `sound`, or the freedesktop "complete" sound
    pub fn new(sound: Option<PathBuf>) -> Self {
        Self {
            sound: sound.unwrap_or_else(|| PathBuf::from(DEFAULT_SUCCESS_SOUND)),
        }
    }

    pub fn sound(&self) -> &Path {
        &self.sound
    }

    /// Start playback
    pub fn play(&self) -> Result<(), CueError> {
        if self.sound.exists() {
            for player in SOUND_PLAYERS {
                match Command::new(player)
                    .arg(&self.sound)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                {
                    Ok(mut child) => {
                        debug!(player, sound = %self.sound.display(), "Playing success cue");
                        std::thread::spawn(move || {
                            if let Err(e) = child.wait() {
                                warn!(error = %e, "Failed to reap sound player");
                            }
                        });
                        return Ok(());
                    }
                    Err(e) => debug!(player, error = %e, "Sound player unavailable"),
                }
            }
        } else {
            debug!(sound = %self.sound.display(), "Success sound missing, using bell");
        }

        ring_bell()
    }
}

fn ring_bell() -> Result<(), CueError> {
    let mut stderr = std::io::stderr();
    stderr
        .write_all(b"\x07")
        .and_then(|_| stderr.flush())
        .map_err(|e| CueError::Failed(e.to_string()))
}
