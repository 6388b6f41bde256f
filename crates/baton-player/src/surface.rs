//! Control-surface boundary: one `osascript` subprocess per command.
//!
//! The surface is deliberately lossy: whatever goes wrong (spawn failure,
//! nonzero exit, empty output) collapses to an empty reply. Callers treat
//! empty or unexpected text as "unknown state" and fall back to safe
//! defaults; nothing at this layer ever raises.

use std::future::Future;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use baton_core::error::Error;

/// Sends one textual command to the external control surface and returns its
/// trimmed textual reply, or an empty string.
pub trait ControlSurface: Send + Sync + 'static {
    fn execute(&self, command: &str) -> impl Future<Output = String> + Send;
}

/// Pick the surface implementation for the current OS. Anything without an
/// AppleScript bridge is rejected here, at construction, rather than deep in
/// a call chain.
pub fn default_surface() -> Result<OsaScriptSurface, Error> {
    match std::env::consts::OS {
        "macos" => Ok(OsaScriptSurface::new()),
        other => Err(Error::UnsupportedPlatform(other)),
    }
}

/// Drives the player through `osascript -`, one child process per command.
/// No batching, no connection reuse: the scripting bridge has neither.
#[derive(Debug, Clone, Default)]
pub struct OsaScriptSurface;

impl OsaScriptSurface {
    pub fn new() -> Self {
        Self
    }
}

impl ControlSurface for OsaScriptSurface {
    async fn execute(&self, command: &str) -> String {
        if command.is_empty() {
            return String::new();
        }

        let mut child = match Command::new("osascript")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!("osascript spawn failed: {e}");
                return String::new();
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            // osascript wants a single-byte encoding on stdin; UTF-8 output
            // comes back on stdout.
            if let Err(e) = stdin.write_all(&latin1_bytes(command)).await {
                debug!("osascript stdin write failed: {e}");
            }
        }

        match child.wait_with_output().await {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
            Err(e) => {
                warn!("osascript did not finish: {e}");
                String::new()
            }
        }
    }
}

/// Latin-1 encode, degrading anything above U+00FF to `?`.
fn latin1_bytes(command: &str) -> Vec<u8> {
    command
        .chars()
        .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
        .collect()
}

// ── AppleScript templates ─────────────────────────────────────────────────────

/// Command templates for the target application.
#[derive(Debug, Clone)]
pub struct Scripts {
    application: String,
}

impl Scripts {
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
        }
    }

    fn tell(&self, body: &str) -> String {
        format!("tell application \"{}\" to {}", self.application, body)
    }

    pub fn is_running(&self) -> String {
        format!("get running of application \"{}\"", self.application)
    }

    pub fn launch(&self) -> String {
        self.tell("launch")
    }

    pub fn player_state(&self) -> String {
        self.tell("player state")
    }

    pub fn play(&self) -> String {
        self.tell("play")
    }

    pub fn pause(&self) -> String {
        self.tell("pause")
    }

    pub fn play_pause(&self) -> String {
        self.tell("playpause")
    }

    pub fn play_key(&self, key: &str) -> String {
        self.tell(&format!("play track \"{key}\""))
    }

    pub fn next_track(&self) -> String {
        self.tell("next track")
    }

    pub fn previous_track(&self) -> String {
        self.tell("previous track")
    }

    pub fn shuffle(&self) -> String {
        self.tell("shuffle")
    }

    pub fn set_shuffle(&self, enabled: bool) -> String {
        self.tell(&format!("set shuffle to {enabled}"))
    }

    pub fn current_artist(&self) -> String {
        self.tell("artist of current track")
    }

    pub fn current_album(&self) -> String {
        self.tell("album of current track")
    }

    pub fn current_song(&self) -> String {
        self.tell("name of current track")
    }

    pub fn current_key(&self) -> String {
        self.tell("key of current track")
    }

    pub fn current_duration(&self) -> String {
        self.tell("duration of current track")
    }

    /// Playback position as a percentage of total duration.
    pub fn current_position(&self) -> String {
        self.tell("player position")
    }

    /// Five fields in one round trip: artist, album, song, duration,
    /// position, joined with ", ".
    pub fn combined_track(&self) -> String {
        self.tell(
            "artist of current track & \", \" & album of current track & \", \" \
             & name of current track & \", \" & duration of current track & \", \" \
             & player position",
        )
    }
}
