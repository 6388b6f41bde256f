//! Transient status-line rendering.
//!
//! One display run lasts a bounded number of cycles; each cycle re-queries
//! the player and rewrites the host's status line, then sleeps one update
//! period. A run halts early (and clears the line) as soon as the player is
//! gone or stopped. Runs are triggered by player events; a trigger while a
//! run is live is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;

use baton_core::config::StatusConfig;

use crate::controller::{PlayerController, PlayerEvent, TrackSnapshot};
use crate::surface::ControlSurface;

/// Host-provided transient status line.
pub trait StatusLine: Send + Sync + 'static {
    fn set(&self, text: &str);
    fn clear(&self);
}

pub struct StatusPresenter<S: ControlSurface, L: StatusLine> {
    inner: Arc<PresenterInner<S, L>>,
}

struct PresenterInner<S: ControlSurface, L> {
    player: PlayerController<S>,
    line: L,
    config: StatusConfig,
    displaying: AtomicBool,
}

impl<S: ControlSurface, L: StatusLine> Clone for StatusPresenter<S, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ControlSurface, L: StatusLine> StatusPresenter<S, L> {
    pub fn new(player: PlayerController<S>, line: L, config: StatusConfig) -> Self {
        Self {
            inner: Arc::new(PresenterInner {
                player,
                line,
                config,
                displaying: AtomicBool::new(false),
            }),
        }
    }

    /// Begin a display run unless one is already live.
    pub fn trigger(&self) {
        if self.inner.displaying.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            run_cycles(&inner).await;
        });
    }

    /// Wire the presenter to the player: react to action/convergence events,
    /// and when configured to display indefinitely, start right away if the
    /// player is already up. Checked once, here.
    pub async fn start(&self) {
        if self.inner.config.duration_secs < 0 && self.inner.player.is_running().await {
            self.trigger();
        }

        let presenter = self.clone();
        let mut events = self.inner.player.subscribe();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    PlayerEvent::Converged { .. } | PlayerEvent::Acted => presenter.trigger(),
                    PlayerEvent::GaveUp { .. } => {}
                }
            }
        });
    }
}

async fn run_cycles<S: ControlSurface, L: StatusLine>(inner: &PresenterInner<S, L>) {
    let period_ms = inner.config.update_period_ms.max(1);
    let period = Duration::from_millis(period_ms);
    // Negative duration: no cycle budget, display while the player runs.
    let mut cycles_left: i64 = if inner.config.duration_secs < 0 {
        -1
    } else {
        inner.config.duration_secs.saturating_mul(1000) / period_ms as i64
    };

    loop {
        if cycles_left == 0 {
            break;
        }
        if cycles_left > 0 {
            cycles_left -= 1;
        }
        if !inner.player.is_running().await || inner.player.is_stopped().await {
            break;
        }
        let message = render_message(inner).await;
        inner.line.set(&message);
        tokio::time::sleep(period).await;
    }

    inner.line.clear();
    inner.displaying.store(false, Ordering::SeqCst);
}

async fn render_message<S: ControlSurface, L: StatusLine>(inner: &PresenterInner<S, L>) -> String {
    let mut bars = ["▁", "▂", "▄", "▅"];
    let icon = if inner.player.is_playing().await {
        bars.shuffle(&mut rand::thread_rng());
        "►"
    } else {
        "∣∣"
    };
    let track = inner.player.current_track().await;
    render_format(&inner.config.format, icon, &bars.concat(), &track)
}

/// Fill the template's named placeholders.
pub fn render_format(template: &str, icon: &str, equalizer: &str, track: &TrackSnapshot) -> String {
    template
        .replace("{icon}", icon)
        .replace("{equalizer}", equalizer)
        .replace("{time}", &min_sec(track.position_secs))
        .replace("{duration}", &min_sec(track.duration_secs))
        .replace("{song}", &track.song)
        .replace("{artist}", &track.artist)
        .replace("{album}", &track.album)
}

/// `M:SS`.
pub fn min_sec(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::config::PlayerConfig;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Clone)]
    struct CannedSurface {
        running: bool,
        playing: bool,
        artist: &'static str,
    }

    impl ControlSurface for CannedSurface {
        async fn execute(&self, command: &str) -> String {
            if command.starts_with("get running") {
                return self.running.to_string();
            }
            if command.ends_with("player state") {
                return if self.playing { "playing" } else { "paused" }.to_string();
            }
            if command.contains("artist of current track &") {
                return format!("{}, Album, Song, 100, 50.0", self.artist);
            }
            if command.ends_with("artist of current track") {
                return self.artist.to_string();
            }
            String::new()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingLine {
        sets: Arc<Mutex<Vec<String>>>,
        clears: Arc<AtomicUsize>,
    }

    impl StatusLine for RecordingLine {
        fn set(&self, text: &str) {
            self.sets.lock().unwrap().push(text.to_string());
        }

        fn clear(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn presenter_parts(
        surface: CannedSurface,
        config: StatusConfig,
    ) -> (Arc<PresenterInner<CannedSurface, RecordingLine>>, RecordingLine) {
        let line = RecordingLine::default();
        let player = PlayerController::new(surface, PlayerConfig::default());
        let inner = Arc::new(PresenterInner {
            player,
            line: line.clone(),
            config,
            displaying: AtomicBool::new(true),
        });
        (inner, line)
    }

    #[test]
    fn test_min_sec_formatting() {
        assert_eq!(min_sec(0), "0:00");
        assert_eq!(min_sec(9), "0:09");
        assert_eq!(min_sec(75), "1:15");
        assert_eq!(min_sec(600), "10:00");
    }

    #[test]
    fn test_render_format_fills_placeholders() {
        let track = TrackSnapshot {
            artist: "The Beatles".into(),
            album: "Abbey Road".into(),
            song: "Come Together".into(),
            duration_secs: 259,
            position_secs: 75,
        };
        let rendered = render_format(
            "{icon} {equalizer} [{time}/{duration}] {song} by {artist} ({album})",
            "►",
            "▁▂▄▅",
            &track,
        );
        assert_eq!(
            rendered,
            "► ▁▂▄▅ [1:15/4:19] Come Together by The Beatles (Abbey Road)"
        );
    }

    #[tokio::test]
    async fn test_run_halts_and_clears_when_player_not_running() {
        let surface = CannedSurface {
            running: false,
            playing: false,
            artist: "x",
        };
        let (inner, line) = presenter_parts(surface, StatusConfig::default());
        run_cycles(&inner).await;
        assert!(line.sets.lock().unwrap().is_empty());
        assert_eq!(line.clears.load(Ordering::SeqCst), 1);
        assert!(!inner.displaying.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_run_halts_when_stopped() {
        // Running but the current track has no artist: the stopped signal.
        let surface = CannedSurface {
            running: true,
            playing: false,
            artist: "",
        };
        let (inner, line) = presenter_parts(surface, StatusConfig::default());
        run_cycles(&inner).await;
        assert!(line.sets.lock().unwrap().is_empty());
        assert_eq!(line.clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_duration_renders_nothing() {
        let surface = CannedSurface {
            running: true,
            playing: true,
            artist: "x",
        };
        let config = StatusConfig {
            duration_secs: 0,
            ..StatusConfig::default()
        };
        let (inner, line) = presenter_parts(surface, config);
        run_cycles(&inner).await;
        assert!(line.sets.lock().unwrap().is_empty());
        assert_eq!(line.clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bounded_run_renders_each_cycle_then_clears() {
        let surface = CannedSurface {
            running: true,
            playing: true,
            artist: "The Kinks",
        };
        let config = StatusConfig {
            duration_secs: 1,
            update_period_ms: 250,
            ..StatusConfig::default()
        };
        let (inner, line) = presenter_parts(surface, config);
        run_cycles(&inner).await;
        let sets = line.sets.lock().unwrap();
        assert_eq!(sets.len(), 4);
        assert!(sets[0].contains("►"));
        assert!(sets[0].contains("The Kinks"));
        assert_eq!(line.clears.load(Ordering::SeqCst), 1);
    }
}
