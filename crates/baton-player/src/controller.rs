//! Player controller: named operations over the control surface plus the
//! launch/convergence protocol.
//!
//! All mutable coordination lives in the external player itself; the
//! controller is a cheaply cloneable handle that issues commands and
//! interprets best-effort text replies. Observable side effects go out over
//! a broadcast channel so the status presenter (and tests) can react without
//! the controller knowing about them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use baton_core::config::PlayerConfig;
use baton_core::retry::{RetryAction, RetryState};

use crate::surface::{ControlSurface, Scripts};

/// Coarse playback state as reported by the control surface. Anything the
/// surface does not answer clearly is `Unknown`, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    Playing,
    Paused,
    #[default]
    Unknown,
}

/// What a convergence run is steering toward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergeTarget {
    /// Player state reaches `Playing`.
    Resume,
    /// The given catalog key becomes the currently playing track.
    Key(String),
}

/// Controller side effects, fanned out to whoever subscribed.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// A convergence run reached its target; one status render is due.
    Converged { target: ConvergeTarget, attempts: u32 },
    /// A convergence run hit the attempt ceiling. Deliberately not surfaced
    /// to the user: reporting failure mid-cold-start is worse than silence.
    GaveUp { target: ConvergeTarget, attempts: u32 },
    /// A direct action (pause, next, previous, shuffle) completed.
    Acted,
}

/// Fresh per-render snapshot of the current track. Never cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSnapshot {
    pub artist: String,
    pub album: String,
    pub song: String,
    pub duration_secs: u64,
    pub position_secs: u64,
}

pub struct PlayerController<S: ControlSurface> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    surface: S,
    scripts: Scripts,
    config: PlayerConfig,
    events: broadcast::Sender<PlayerEvent>,
}

impl<S: ControlSurface> Clone for PlayerController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ControlSurface> PlayerController<S> {
    pub fn new(surface: S, config: PlayerConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        let scripts = Scripts::new(config.application.clone());
        Self {
            inner: Arc::new(Inner {
                surface,
                scripts,
                config,
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.inner.events.subscribe()
    }

    async fn execute(&self, command: String) -> String {
        self.inner.surface.execute(&command).await
    }

    fn emit(&self, event: PlayerEvent) {
        // No receivers is fine.
        let _ = self.inner.events.send(event);
    }

    // ── queries ───────────────────────────────────────────────────────────────

    pub async fn is_running(&self) -> bool {
        self.execute(self.inner.scripts.is_running()).await == "true"
    }

    pub async fn state(&self) -> PlayerState {
        match self.execute(self.inner.scripts.player_state()).await.as_str() {
            "playing" => PlayerState::Playing,
            "paused" => PlayerState::Paused,
            _ => PlayerState::Unknown,
        }
    }

    pub async fn is_playing(&self) -> bool {
        self.state().await == PlayerState::Playing
    }

    pub async fn is_paused(&self) -> bool {
        self.state().await == PlayerState::Paused
    }

    /// The surface never reports a genuine stopped state; an empty artist on
    /// the current track is the closest observable signal.
    pub async fn is_stopped(&self) -> bool {
        self.execute(self.inner.scripts.current_artist())
            .await
            .is_empty()
    }

    pub async fn current_key(&self) -> String {
        self.execute(self.inner.scripts.current_key()).await
    }

    /// One combined five-field read; falls back to five discrete reads when
    /// a field contained the separator and broke the combined parse.
    pub async fn current_track(&self) -> TrackSnapshot {
        let combined = self.execute(self.inner.scripts.combined_track()).await;
        if let Some(snapshot) = parse_combined(&combined) {
            return snapshot;
        }

        let artist = self.execute(self.inner.scripts.current_artist()).await;
        let album = self.execute(self.inner.scripts.current_album()).await;
        let song = self.execute(self.inner.scripts.current_song()).await;
        let duration_secs =
            parse_float(&self.execute(self.inner.scripts.current_duration()).await) as u64;
        let percent = parse_float(&self.execute(self.inner.scripts.current_position()).await);
        TrackSnapshot {
            artist,
            album,
            song,
            duration_secs,
            position_secs: position_seconds(percent, duration_secs),
        }
    }

    // ── actions ───────────────────────────────────────────────────────────────

    pub async fn play(&self) {
        self.converge(ConvergeTarget::Resume).await;
    }

    /// Play a track or album by catalog key, launching the player first if
    /// needed.
    pub async fn play_key(&self, key: &str) {
        self.converge(ConvergeTarget::Key(key.to_string())).await;
    }

    pub async fn pause(&self) {
        self.execute(self.inner.scripts.pause()).await;
        self.emit(PlayerEvent::Acted);
    }

    pub async fn play_pause(&self) {
        self.execute(self.inner.scripts.play_pause()).await;
        self.emit(PlayerEvent::Acted);
    }

    pub async fn next(&self) {
        self.execute(self.inner.scripts.next_track()).await;
        self.emit(PlayerEvent::Acted);
    }

    pub async fn previous(&self) {
        self.execute(self.inner.scripts.previous_track()).await;
        if self.inner.config.double_previous {
            // The surface's first go-back only restarts the current track.
            self.execute(self.inner.scripts.previous_track()).await;
        }
        self.emit(PlayerEvent::Acted);
    }

    pub async fn toggle_shuffle(&self) {
        let enabled = self.execute(self.inner.scripts.shuffle()).await == "true";
        self.execute(self.inner.scripts.set_shuffle(!enabled)).await;
        self.emit(PlayerEvent::Acted);
    }

    // ── convergence ───────────────────────────────────────────────────────────

    async fn converge(&self, target: ConvergeTarget) {
        let mut retry = RetryState::new(self.inner.config.max_attempts);
        let delay = Duration::from_millis(self.inner.config.retry_delay_ms);

        loop {
            let running = self.is_running().await;
            let converged = running
                && match &target {
                    ConvergeTarget::Resume => self.is_playing().await,
                    ConvergeTarget::Key(key) => self.current_key().await == *key,
                };

            match retry.step(running, converged) {
                RetryAction::Done => {
                    debug!("converged on {target:?} after {} attempts", retry.attempts());
                    self.emit(PlayerEvent::Converged {
                        target,
                        attempts: retry.attempts(),
                    });
                    return;
                }
                RetryAction::GiveUp => {
                    warn!(
                        "gave up converging on {target:?} after {} attempts",
                        retry.attempts()
                    );
                    self.emit(PlayerEvent::GaveUp {
                        target,
                        attempts: retry.attempts(),
                    });
                    return;
                }
                RetryAction::Launch => {
                    self.execute(self.inner.scripts.launch()).await;
                }
                RetryAction::Command => {
                    match &target {
                        ConvergeTarget::Resume => self.execute(self.inner.scripts.play()).await,
                        ConvergeTarget::Key(key) => {
                            self.execute(self.inner.scripts.play_key(key)).await
                        }
                    };
                }
            }

            tokio::time::sleep(delay).await;
        }
    }
}

/// Percent-of-duration to absolute seconds. Zero duration or a garbled
/// reply collapses to zero instead of propagating a non-finite value.
pub fn position_seconds(percent: f64, duration_secs: u64) -> u64 {
    let seconds = duration_secs as f64 * percent / 100.0;
    if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    }
}

fn parse_combined(reply: &str) -> Option<TrackSnapshot> {
    if reply.is_empty() {
        return None;
    }
    let fields: Vec<&str> = reply.split(", ").collect();
    if fields.len() != 5 {
        return None;
    }
    let duration_secs = parse_float(fields[3]) as u64;
    Some(TrackSnapshot {
        artist: fields[0].to_string(),
        album: fields[1].to_string(),
        song: fields[2].to_string(),
        duration_secs,
        position_secs: position_seconds(parse_float(fields[4]), duration_secs),
    })
}

fn parse_float(reply: &str) -> f64 {
    reply.trim().parse().unwrap_or(0.0)
}
