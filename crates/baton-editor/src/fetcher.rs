//! Background suggestion fetcher: one long-lived task per search session.
//!
//! Keystrokes arrive faster than the catalog can answer, so the loop blocks
//! on the query channel and then drains whatever queued up behind it,
//! keeping only the newest entry. Each distinct query goes out exactly once;
//! a repeat of the last-sent query is skipped. The loop ends on the `Stop`
//! sentinel or when the session drops its sender.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use baton_core::suggest::{build_suggestions, Suggestion};

use crate::api::CatalogApi;

/// Inbound messages for the fetch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMsg {
    Query { text: String, budget: usize },
    /// Termination sentinel, pushed on commit and cancel.
    Stop,
}

pub fn spawn_fetcher<C: CatalogApi>(
    catalog: C,
    mut queries: mpsc::UnboundedReceiver<QueryMsg>,
    suggestions: mpsc::UnboundedSender<Vec<Suggestion>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_sent: Option<String> = None;

        while let Some(first) = queries.recv().await {
            // Coalesce: whatever queued up behind this message is already
            // stale, keep only the newest.
            let mut newest = first;
            while let Ok(next) = queries.try_recv() {
                newest = next;
            }

            match newest {
                QueryMsg::Stop => break,
                QueryMsg::Query { text, budget } => {
                    if last_sent.as_deref() == Some(text.as_str()) {
                        continue;
                    }
                    last_sent = Some(text.clone());
                    match catalog.search_suggestions(text).await {
                        Ok(rows) => {
                            let _ = suggestions.send(build_suggestions(&rows, budget));
                        }
                        // Suggestion fetches are best-effort; the session
                        // keeps whatever list it already shows.
                        Err(e) => warn!("suggestion fetch failed: {e}"),
                    }
                }
            }
        }
        debug!("suggestion fetcher stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::catalog::{ResultRow, SearchPage};
    use baton_core::error::Error;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct ScriptedCatalog {
        fetched: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl CatalogApi for ScriptedCatalog {
        async fn search(&self, _query: String, _types: String) -> Result<SearchPage, Error> {
            unimplemented!("not used by the fetcher")
        }

        async fn search_suggestions(&self, query: String) -> Result<Vec<ResultRow>, Error> {
            self.fetched.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(Error::ApiStatus("error".into()));
            }
            Ok(vec![ResultRow {
                kind: "t".into(),
                name: format!("match for {query}"),
                key: "t1".into(),
                ..ResultRow::default()
            }])
        }

        async fn tracks_for_artist(
            &self,
            _artist_key: String,
            _count: usize,
        ) -> Result<Vec<ResultRow>, Error> {
            unimplemented!("not used by the fetcher")
        }

        async fn albums_for_artist(
            &self,
            _artist_key: String,
            _count: usize,
        ) -> Result<Vec<ResultRow>, Error> {
            unimplemented!("not used by the fetcher")
        }

        async fn album_tracks(&self, _album_key: String) -> Result<Vec<ResultRow>, Error> {
            unimplemented!("not used by the fetcher")
        }
    }

    fn query(text: &str) -> QueryMsg {
        QueryMsg::Query {
            text: text.into(),
            budget: 100,
        }
    }

    #[tokio::test]
    async fn test_rapid_keystrokes_coalesce_to_newest() {
        let catalog = ScriptedCatalog::default();
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let (suggestion_tx, mut suggestion_rx) = mpsc::unbounded_channel();

        // Queue a burst before the task gets to run.
        query_tx.send(query("th")).unwrap();
        query_tx.send(query("the")).unwrap();
        query_tx.send(query("the b")).unwrap();

        let handle = spawn_fetcher(catalog.clone(), query_rx, suggestion_tx);

        let list = suggestion_rx.recv().await.unwrap();
        assert_eq!(list[0].name, "match for the b");
        assert_eq!(catalog.fetched.lock().unwrap().as_slice(), ["the b"]);

        query_tx.send(QueryMsg::Stop).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_repeat_query_not_refetched() {
        let catalog = ScriptedCatalog::default();
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let (suggestion_tx, mut suggestion_rx) = mpsc::unbounded_channel();
        let handle = spawn_fetcher(catalog.clone(), query_rx, suggestion_tx);

        query_tx.send(query("abc")).unwrap();
        let _ = suggestion_rx.recv().await.unwrap();

        query_tx.send(query("abc")).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(catalog.fetched.lock().unwrap().len(), 1);
        assert!(suggestion_rx.try_recv().is_err());

        query_tx.send(QueryMsg::Stop).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_behind_queries_wins() {
        let catalog = ScriptedCatalog::default();
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let (suggestion_tx, _suggestion_rx) = mpsc::unbounded_channel();

        query_tx.send(query("abc")).unwrap();
        query_tx.send(QueryMsg::Stop).unwrap();

        let handle = spawn_fetcher(catalog.clone(), query_rx, suggestion_tx);
        handle.await.unwrap();
        assert!(catalog.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_loop_alive() {
        let catalog = ScriptedCatalog {
            fail: true,
            ..ScriptedCatalog::default()
        };
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let (suggestion_tx, mut suggestion_rx) = mpsc::unbounded_channel();
        let handle = spawn_fetcher(catalog.clone(), query_rx, suggestion_tx);

        query_tx.send(query("abc")).unwrap();
        query_tx.send(QueryMsg::Stop).unwrap();
        handle.await.unwrap();

        assert_eq!(catalog.fetched.lock().unwrap().len(), 1);
        assert!(suggestion_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sender_drop_ends_loop() {
        let catalog = ScriptedCatalog::default();
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let (suggestion_tx, _suggestion_rx) = mpsc::unbounded_channel();
        let handle = spawn_fetcher(catalog, query_rx, suggestion_tx);
        drop(query_tx);
        handle.await.unwrap();
    }
}
