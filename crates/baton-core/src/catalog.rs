//! Remote catalog API client.
//!
//! Method-based JSON API over HTTPS: one POST per call with a `method` form
//! field plus parameters and the api key/secret pair. Every response is an
//! envelope whose `status` field must equal `"ok"`; the payload lives under
//! `result` with a per-method shape.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::Error;

/// One result row as the catalog returns it. Fields beyond the discriminator
/// are method-dependent, so everything defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    /// Track count for album rows.
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(rename = "trackKeys", default)]
    pub track_keys: Vec<String>,
}

/// Payload of the `search` method.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub number_results: u64,
    #[serde(default)]
    pub results: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    result: Value,
}

#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
    secret: String,
}

impl CatalogClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            key: config.key.clone(),
            secret: config.secret.clone(),
        }
    }

    /// Cheapest possible round trip to prove the key/secret pair works.
    pub async fn validate_credentials(&self) -> Result<(), Error> {
        self.call("get", &[("keys", String::new())]).await.map(|_| ())
    }

    pub async fn search(&self, query: &str, types: &str) -> Result<SearchPage, Error> {
        let result = self
            .call(
                "search",
                &[
                    ("query", query.to_string()),
                    ("types", types.to_string()),
                ],
            )
            .await?;
        serde_json::from_value(result).map_err(|e| Error::Malformed(e.to_string()))
    }

    pub async fn search_suggestions(&self, query: &str) -> Result<Vec<ResultRow>, Error> {
        let result = self
            .call("searchSuggestions", &[("query", query.to_string())])
            .await?;
        rows_from(result)
    }

    pub async fn tracks_for_artist(
        &self,
        artist_key: &str,
        count: usize,
    ) -> Result<Vec<ResultRow>, Error> {
        let result = self
            .call(
                "getTracksForArtist",
                &[
                    ("artist", artist_key.to_string()),
                    ("count", count.to_string()),
                ],
            )
            .await?;
        rows_from(result)
    }

    pub async fn albums_for_artist(
        &self,
        artist_key: &str,
        count: usize,
    ) -> Result<Vec<ResultRow>, Error> {
        let result = self
            .call(
                "getAlbumsForArtist",
                &[
                    ("artist", artist_key.to_string()),
                    ("count", count.to_string()),
                ],
            )
            .await?;
        rows_from(result)
    }

    /// Batched object fetch, keyed by catalog key.
    pub async fn get(&self, keys: &[String]) -> Result<serde_json::Map<String, Value>, Error> {
        let result = self.call("get", &[("keys", keys.join(", "))]).await?;
        match result {
            Value::Object(map) => Ok(map),
            other => Err(Error::Malformed(format!(
                "get returned non-object result: {other}"
            ))),
        }
    }

    /// Tracks on an album, in album order: fetch the album object for its
    /// `trackKeys`, then batch-fetch the tracks themselves.
    pub async fn album_tracks(&self, album_key: &str) -> Result<Vec<ResultRow>, Error> {
        let albums = self.get(&[album_key.to_string()]).await?;
        let album = albums
            .get(album_key)
            .ok_or_else(|| Error::Malformed(format!("album {album_key} missing from get")))?;
        let album: ResultRow = serde_json::from_value(album.clone())
            .map_err(|e| Error::Malformed(e.to_string()))?;

        if album.track_keys.is_empty() {
            return Ok(Vec::new());
        }
        let tracks = self.get(&album.track_keys).await?;
        let mut rows = Vec::with_capacity(album.track_keys.len());
        for key in &album.track_keys {
            if let Some(value) = tracks.get(key) {
                let row: ResultRow = serde_json::from_value(value.clone())
                    .map_err(|e| Error::Malformed(e.to_string()))?;
                rows.push(row);
            }
        }
        Ok(rows)
    }

    async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Value, Error> {
        let mut form: Vec<(&str, String)> = vec![
            ("method", method.to_string()),
            ("api_key", self.key.clone()),
            ("api_secret", self.secret.clone()),
        ];
        form.extend(params.iter().cloned());

        debug!("catalog call: {method}");
        let response = self
            .http
            .post(&self.base_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        let envelope: Envelope = response.json().await?;
        parse_envelope(envelope)
    }
}

fn parse_envelope(envelope: Envelope) -> Result<Value, Error> {
    if envelope.status != "ok" {
        return Err(Error::ApiStatus(envelope.status));
    }
    Ok(envelope.result)
}

fn rows_from(result: Value) -> Result<Vec<ResultRow>, Error> {
    serde_json::from_value(result).map_err(|e| Error::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok_passes_result_through() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"status": "ok", "result": [1, 2]}"#).unwrap();
        let result = parse_envelope(envelope).unwrap();
        assert_eq!(result, serde_json::json!([1, 2]));
    }

    #[test]
    fn test_envelope_error_status_is_rejected() {
        let envelope: Envelope = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        match parse_envelope(envelope) {
            Err(Error::ApiStatus(status)) => assert_eq!(status, "error"),
            other => panic!("expected ApiStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_result_rows_parse_with_partial_fields() {
        let rows = rows_from(serde_json::json!([
            {"type": "t", "name": "Paint It Black", "key": "t42", "artist": "The Rolling Stones", "album": "Aftermath"},
            {"type": "r", "name": "The Rolling Stones", "key": "r7"}
        ]))
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].album, "Aftermath");
        assert_eq!(rows[1].artist, "");
        assert!(rows[1].track_keys.is_empty());
    }

    #[test]
    fn test_search_page_parses() {
        let page: SearchPage = serde_json::from_value(serde_json::json!({
            "number_results": 1,
            "results": [{"type": "a", "name": "Aftermath", "key": "a9", "length": 11}]
        }))
        .unwrap();
        assert_eq!(page.number_results, 1);
        assert_eq!(page.results[0].length, Some(11));
    }

    #[test]
    fn test_album_track_keys_parse() {
        let row: ResultRow = serde_json::from_value(serde_json::json!({
            "type": "a", "name": "Aftermath", "key": "a9", "trackKeys": ["t1", "t2"]
        }))
        .unwrap();
        assert_eq!(row.track_keys, vec!["t1", "t2"]);
    }
}
