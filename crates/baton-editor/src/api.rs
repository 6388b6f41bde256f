//! Seam over the remote catalog so the session and fetcher can run against
//! a scripted catalog in tests. `CatalogClient` is the one real
//! implementation.

use std::future::Future;

use baton_core::catalog::{CatalogClient, ResultRow, SearchPage};
use baton_core::error::Error;

pub trait CatalogApi: Clone + Send + Sync + 'static {
    fn search(
        &self,
        query: String,
        types: String,
    ) -> impl Future<Output = Result<SearchPage, Error>> + Send;

    fn search_suggestions(
        &self,
        query: String,
    ) -> impl Future<Output = Result<Vec<ResultRow>, Error>> + Send;

    fn tracks_for_artist(
        &self,
        artist_key: String,
        count: usize,
    ) -> impl Future<Output = Result<Vec<ResultRow>, Error>> + Send;

    fn albums_for_artist(
        &self,
        artist_key: String,
        count: usize,
    ) -> impl Future<Output = Result<Vec<ResultRow>, Error>> + Send;

    fn album_tracks(
        &self,
        album_key: String,
    ) -> impl Future<Output = Result<Vec<ResultRow>, Error>> + Send;
}

impl CatalogApi for CatalogClient {
    async fn search(&self, query: String, types: String) -> Result<SearchPage, Error> {
        CatalogClient::search(self, &query, &types).await
    }

    async fn search_suggestions(&self, query: String) -> Result<Vec<ResultRow>, Error> {
        CatalogClient::search_suggestions(self, &query).await
    }

    async fn tracks_for_artist(
        &self,
        artist_key: String,
        count: usize,
    ) -> Result<Vec<ResultRow>, Error> {
        CatalogClient::tracks_for_artist(self, &artist_key, count).await
    }

    async fn albums_for_artist(
        &self,
        artist_key: String,
        count: usize,
    ) -> Result<Vec<ResultRow>, Error> {
        CatalogClient::albums_for_artist(self, &artist_key, count).await
    }

    async fn album_tracks(&self, album_key: String) -> Result<Vec<ResultRow>, Error> {
        CatalogClient::album_tracks(self, &album_key).await
    }
}
