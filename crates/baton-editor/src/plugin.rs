//! Plugin facade: configuration, logging, credential validation, and the
//! command entry points the host editor binds.

use tracing::{info, warn};

use baton_core::catalog::CatalogClient;
use baton_core::config::Config;
use baton_core::platform;
use baton_player::controller::PlayerController;
use baton_player::status::{StatusLine, StatusPresenter};
use baton_player::surface::{default_surface, ControlSurface, OsaScriptSurface};

use crate::host::EditorHost;
use crate::session::{self, SearchHandle};

const INVALID_CREDENTIALS_MESSAGE: &str = "Sorry, search requires a valid API key and \
    secret to work. See the baton package settings for more information.";

pub struct Plugin<S: ControlSurface, L: StatusLine> {
    config: Config,
    player: PlayerController<S>,
    presenter: StatusPresenter<S, L>,
    catalog: CatalogClient,
    search_available: bool,
}

impl<L: StatusLine> Plugin<OsaScriptSurface, L> {
    /// Load config, pick the control surface for this OS, and wire
    /// everything up. Fails only on an unsupported platform.
    pub async fn load(status_line: L) -> anyhow::Result<Self> {
        let config = Config::load().unwrap_or_default();
        let surface = default_surface()?;
        Ok(Self::with_surface(surface, status_line, config).await)
    }
}

impl<S: ControlSurface, L: StatusLine> Plugin<S, L> {
    pub async fn with_surface(surface: S, status_line: L, config: Config) -> Self {
        let player = PlayerController::new(surface, config.player.clone());
        let presenter = StatusPresenter::new(player.clone(), status_line, config.status.clone());
        presenter.start().await;

        let catalog = CatalogClient::new(&config.api);
        // Checked once; a rejection only disables search.
        let search_available = match catalog.validate_credentials().await {
            Ok(()) => true,
            Err(e) => {
                warn!("catalog credentials rejected: {e}");
                false
            }
        };
        info!("plugin ready (search available: {search_available})");

        Self {
            config,
            player,
            presenter,
            catalog,
            search_available,
        }
    }

    pub fn player(&self) -> &PlayerController<S> {
        &self.player
    }

    pub async fn play(&self) {
        self.player.play().await;
    }

    pub async fn pause(&self) {
        self.player.pause().await;
    }

    pub async fn play_pause(&self) {
        self.player.play_pause().await;
    }

    pub async fn next_track(&self) {
        self.player.next().await;
    }

    pub async fn previous_track(&self) {
        self.player.previous().await;
    }

    pub async fn toggle_shuffle(&self) {
        self.player.toggle_shuffle().await;
    }

    /// Show the now-playing status line.
    pub fn now_playing(&self) {
        self.presenter.trigger();
    }

    /// Open the interactive search panel. Returns `None` (after showing the
    /// error dialog) when the credentials failed validation at load time.
    pub fn open_search<H: EditorHost>(&self, mut host: H) -> Option<SearchHandle> {
        if !self.search_available {
            host.show_error(INVALID_CREDENTIALS_MESSAGE);
            return None;
        }
        Some(session::open(
            host,
            self.player.clone(),
            self.catalog.clone(),
            self.config.search.clone(),
        ))
    }
}

/// File logging under the data dir; `RUST_LOG` overrides the default filter.
pub fn init_logging() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("baton.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,baton_editor=debug".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter.as_str())
        .with_ansi(false)
        .init();

    info!("log file: {}", log_path.display());
    Ok(())
}
