use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    db::Cache,
    services::{
        HttpPlaylistStore, HttpSongSuggester, PlaylistStore, SongSuggester, SpotifyApi,
        SpotifyClient,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub spotify: Arc<dyn SpotifyApi>,
    pub store: Arc<dyn PlaylistStore>,
    pub suggester: Arc<dyn SongSuggester>,
}

impl AppState {
    pub fn new(
        config: Config,
        spotify: Arc<dyn SpotifyApi>,
        store: Arc<dyn PlaylistStore>,
        suggester: Arc<dyn SongSuggester>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            spotify,
            store,
            suggester,
        }
    }

    /// Wires the HTTP-backed services described by `config`
    pub fn from_config(config: Config, cache: Option<Cache>) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!("melofy-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let spotify = SpotifyClient::new(
            http_client.clone(),
            config.spotify_api_url.clone(),
            config.spotify_accounts_url.clone(),
            cache,
        );
        let store = HttpPlaylistStore::new(http_client.clone(), config.playlist_api_url.clone());
        let suggester = HttpSongSuggester::new(http_client, config.playlist_api_url.clone());

        Ok(Self::new(
            config,
            Arc::new(spotify),
            Arc::new(store),
            Arc::new(suggester),
        ))
    }
}
