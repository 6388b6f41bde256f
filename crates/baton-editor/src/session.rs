//! Interactive search session: a single-owner event loop per invocation.
//!
//! One spawned task owns the buffer, the menu state, and the host handle;
//! everything else reaches it through messages. Host callbacks arrive via
//! [`SearchHandle`], fetched suggestion lists are forwarded from the
//! fetcher's channel, and one-shot catalog requests run on their own tasks
//! and report back as [`SessionEvent::Response`]. In-flight requests cannot
//! be cancelled, so responses carry a generation tag and stale ones are
//! dropped on arrival.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use baton_core::catalog::ResultRow;
use baton_core::config::SearchConfig;
use baton_core::entity::EntityKind;
use baton_core::error::Error;
use baton_core::suggest::Suggestion;
use baton_player::controller::PlayerController;
use baton_player::surface::ControlSurface;

use crate::api::CatalogApi;
use crate::buffer::SearchBuffer;
use crate::fetcher::{spawn_fetcher, QueryMsg};
use crate::host::{EditorHost, MenuRow};

const SEARCH_TYPES: &str = "Artist, Album, Track";
const ARTIST_TRACKS_COUNT: usize = 50;
const ARTIST_ALBUMS_COUNT: usize = 20;

/// Inputs into the session loop.
#[derive(Debug)]
pub enum SessionEvent {
    /// Input-panel content changed (a keystroke, or the echo of our redraw).
    Changed(String),
    /// Input panel committed.
    Committed(String),
    /// Input panel dismissed.
    Cancelled,
    /// Fresh suggestion list from the background fetcher.
    Suggestions(Vec<Suggestion>),
    /// The user picked a quick-menu row; `None` is a dismissal.
    MenuPicked(Option<usize>),
    /// A one-shot catalog request finished.
    Response {
        generation: u64,
        outcome: Result<Vec<ResultRow>, Error>,
    },
}

/// Handle the host adapter uses to feed its callbacks into the session.
/// Sends never block; a send after the session closed is a no-op.
#[derive(Clone)]
pub struct SearchHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SearchHandle {
    pub fn changed(&self, content: impl Into<String>) {
        let _ = self.tx.send(SessionEvent::Changed(content.into()));
    }

    pub fn committed(&self, content: impl Into<String>) {
        let _ = self.tx.send(SessionEvent::Committed(content.into()));
    }

    pub fn cancelled(&self) {
        let _ = self.tx.send(SessionEvent::Cancelled);
    }

    pub fn menu_picked(&self, index: Option<usize>) {
        let _ = self.tx.send(SessionEvent::MenuPicked(index));
    }
}

/// Which quick menu is on display, and what its rows mean.
#[derive(Debug)]
enum Menu {
    ArtistOptions { key: String },
    AlbumOptions { key: String },
    Results(Vec<ResultRow>),
}

/// Open a search session: steals the editor's tab-completion preference,
/// opens an empty input panel, starts the suggestion fetcher, and spawns the
/// event loop. Lives until commit or cancel.
pub fn open<S, H, C>(
    mut host: H,
    player: PlayerController<S>,
    catalog: C,
    config: SearchConfig,
) -> SearchHandle
where
    S: ControlSurface,
    H: EditorHost,
    C: CatalogApi,
{
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (query_tx, query_rx) = mpsc::unbounded_channel();
    let (suggestion_tx, mut suggestion_rx) = mpsc::unbounded_channel();

    if config.enable_suggestions {
        spawn_fetcher(catalog.clone(), query_rx, suggestion_tx);
        // Hand fetched lists off to the session loop.
        let events = event_tx.clone();
        tokio::spawn(async move {
            while let Some(list) = suggestion_rx.recv().await {
                if events.send(SessionEvent::Suggestions(list)).is_err() {
                    break;
                }
            }
        });
    }

    // TAB must cycle suggestions, not complete; restored on commit/cancel.
    let saved_tab_completion = host.tab_completion();
    host.set_tab_completion(false);
    host.redraw_input("");

    let min_query_len = config.min_query_len;
    let session = SearchSession {
        host,
        player,
        catalog,
        config,
        buffer: SearchBuffer::new(min_query_len),
        query_tx,
        events_tx: event_tx.clone(),
        generation: 0,
        menu: None,
        saved_tab_completion,
        done: false,
    };
    tokio::spawn(session.run(event_rx));

    SearchHandle { tx: event_tx }
}

struct SearchSession<S: ControlSurface, H: EditorHost, C: CatalogApi> {
    host: H,
    player: PlayerController<S>,
    catalog: C,
    config: SearchConfig,
    buffer: SearchBuffer,
    query_tx: mpsc::UnboundedSender<QueryMsg>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    generation: u64,
    menu: Option<Menu>,
    saved_tab_completion: Option<bool>,
    done: bool,
}

impl<S: ControlSurface, H: EditorHost, C: CatalogApi> SearchSession<S, H, C> {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
            if self.done {
                break;
            }
        }
        debug!("search session closed");
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Changed(content) => self.on_change(&content),
            SessionEvent::Committed(text) => self.on_commit(text).await,
            SessionEvent::Cancelled => self.close(),
            SessionEvent::Suggestions(list) => {
                if let Some(text) = self.buffer.absorb_suggestions(list) {
                    self.redraw(text);
                }
            }
            SessionEvent::MenuPicked(index) => self.on_menu_picked(index).await,
            SessionEvent::Response {
                generation,
                outcome,
            } => self.on_response(generation, outcome),
        }
    }

    fn on_change(&mut self, content: &str) {
        if !self.config.enable_suggestions {
            // Plain input field: just remember the text for commit.
            self.buffer.set_typed(content);
            return;
        }

        let outcome = self.buffer.on_change(content);
        if let Some(query) = outcome.query {
            let budget = self.buffer.suggestion_budget(self.host.input_width());
            let _ = self.query_tx.send(QueryMsg::Query {
                text: query,
                budget,
            });
        }
        if let Some(text) = outcome.redraw {
            self.redraw(text);
        }
    }

    async fn on_commit(&mut self, final_text: String) {
        let _ = self.query_tx.send(QueryMsg::Stop);
        self.restore_tab_completion();

        let (query, key) = self.buffer.resolve_commit(&final_text);
        match key {
            Some(key) => self.route_key(query, key).await,
            None => self.spawn_search(query),
        }
    }

    /// A catalog key routes by its kind; anything unrecognised degrades to a
    /// plain search.
    async fn route_key(&mut self, name: String, key: String) {
        match EntityKind::from_key(&key) {
            Some(EntityKind::Artist) => self.show_artist_options(name, key),
            Some(EntityKind::Album) => self.show_album_options(name, key),
            Some(EntityKind::Track) => {
                self.player.play_key(&key).await;
                self.done = true;
            }
            None => self.spawn_search(name),
        }
    }

    fn show_artist_options(&mut self, name: String, key: String) {
        let rows = [
            MenuRow::new(format!("Songs by {name}"), ""),
            MenuRow::new(format!("Albums by {name}"), ""),
        ];
        self.menu = Some(Menu::ArtistOptions { key });
        self.host.show_menu(&rows);
    }

    fn show_album_options(&mut self, name: String, key: String) {
        let rows = [
            MenuRow::new(format!("Play {name}"), ""),
            MenuRow::new(format!("Show tracks on {name}"), ""),
        ];
        self.menu = Some(Menu::AlbumOptions { key });
        self.host.show_menu(&rows);
    }

    async fn on_menu_picked(&mut self, index: Option<usize>) {
        let Some(menu) = self.menu.take() else {
            return;
        };
        let Some(index) = index else {
            // Menu dismissed; nothing left to do.
            self.done = true;
            return;
        };

        match menu {
            Menu::ArtistOptions { key } => match index {
                0 => self.spawn_tracks_for_artist(key),
                1 => self.spawn_albums_for_artist(key),
                _ => self.done = true,
            },
            Menu::AlbumOptions { key } => match index {
                0 => {
                    self.player.play_key(&key).await;
                    self.done = true;
                }
                1 => self.spawn_album_tracks(key),
                _ => self.done = true,
            },
            Menu::Results(rows) => match rows.get(index) {
                Some(row) => {
                    let name = row.name.clone();
                    let key = row.key.clone();
                    match EntityKind::from_key(&key) {
                        Some(EntityKind::Artist) => self.show_artist_options(name, key),
                        Some(EntityKind::Album) => self.show_album_options(name, key),
                        _ => {
                            self.player.play_key(&key).await;
                            self.done = true;
                        }
                    }
                }
                None => self.done = true,
            },
        }
    }

    fn on_response(&mut self, generation: u64, outcome: Result<Vec<ResultRow>, Error>) {
        if generation != self.generation {
            debug!("dropping stale catalog response (gen {generation})");
            return;
        }

        match outcome {
            Err(e) => {
                warn!("catalog request failed: {e}");
                self.host.show_error(&format!("Unable to search:\n{e}"));
                self.done = true;
            }
            Ok(rows) => {
                let rows: Vec<ResultRow> = rows
                    .into_iter()
                    .filter(|r| EntityKind::from_type_tag(&r.kind).is_some())
                    .take(self.config.max_results)
                    .collect();
                if rows.is_empty() {
                    self.redraw("No results found, try again?".to_string());
                    return;
                }
                let menu_rows: Vec<MenuRow> = rows.iter().map(result_menu_row).collect();
                self.menu = Some(Menu::Results(rows));
                self.host.show_menu(&menu_rows);
            }
        }
    }

    fn redraw(&mut self, text: String) {
        self.buffer.expect_echo();
        self.host.redraw_input(&text);
    }

    fn close(&mut self) {
        let _ = self.query_tx.send(QueryMsg::Stop);
        self.restore_tab_completion();
        self.done = true;
    }

    fn restore_tab_completion(&mut self) {
        if let Some(saved) = self.saved_tab_completion.take() {
            self.host.set_tab_completion(saved);
        }
    }

    fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn spawn_search(&mut self, query: String) {
        let generation = self.bump_generation();
        let catalog = self.catalog.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = catalog
                .search(query, SEARCH_TYPES.to_string())
                .await
                .map(|page| page.results);
            let _ = events.send(SessionEvent::Response {
                generation,
                outcome,
            });
        });
    }

    fn spawn_tracks_for_artist(&mut self, key: String) {
        let generation = self.bump_generation();
        let catalog = self.catalog.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = catalog.tracks_for_artist(key, ARTIST_TRACKS_COUNT).await;
            let _ = events.send(SessionEvent::Response {
                generation,
                outcome,
            });
        });
    }

    fn spawn_albums_for_artist(&mut self, key: String) {
        let generation = self.bump_generation();
        let catalog = self.catalog.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = catalog.albums_for_artist(key, ARTIST_ALBUMS_COUNT).await;
            let _ = events.send(SessionEvent::Response {
                generation,
                outcome,
            });
        });
    }

    fn spawn_album_tracks(&mut self, key: String) {
        let generation = self.bump_generation();
        let catalog = self.catalog.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = catalog.album_tracks(key).await;
            let _ = events.send(SessionEvent::Response {
                generation,
                outcome,
            });
        });
    }
}

fn result_menu_row(row: &ResultRow) -> MenuRow {
    match EntityKind::from_type_tag(&row.kind) {
        Some(EntityKind::Track) => MenuRow::new(
            format!("{} by {}", row.name, row.artist),
            row.album.clone(),
        ),
        Some(EntityKind::Album) => {
            MenuRow::new(format!("{} [Album]", row.name), format!("by {}", row.artist))
        }
        Some(EntityKind::Artist) => MenuRow::new(format!("{} [Artist]", row.name), ""),
        None => MenuRow::new(row.name.clone(), ""),
    }
}
