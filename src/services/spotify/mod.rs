/// Spotify Web API and Accounts service access
///
/// The trait is the seam the playlist flows are written against; the HTTP
/// implementation lives in [`client`].
use crate::{
    config::ClientCredentials,
    error::{AppError, AppResult},
    models::{AccessToken, NewPlaylist, SpotifyPlaylist, SpotifyUser, Track},
};

pub mod client;

pub use client::SpotifyClient;

/// Scopes requested from visitors: enough to create and fill their playlists
pub const PLAYLIST_SCOPES: &str = "playlist-modify-public playlist-modify-private";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Trades an authorization code for an access token
    async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        redirect_uri: &str,
    ) -> AppResult<AccessToken>;

    /// Mints an access token from a long-lived refresh token
    async fn refresh_access_token(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> AppResult<AccessToken>;

    async fn current_user(&self, access_token: &str) -> AppResult<SpotifyUser>;

    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> AppResult<SpotifyPlaylist>;

    /// First track matching a search query, if any
    async fn search_track(&self, access_token: &str, query: &str) -> AppResult<Option<Track>>;

    /// A single recommendation seeded by one artist
    async fn recommend_track(
        &self,
        access_token: &str,
        seed_artist: &str,
    ) -> AppResult<Option<Track>>;

    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> AppResult<()>;
}

/// Builds the Accounts service URL a visitor is sent to for consent
///
/// `state` carries the draft id through the OAuth round trip.
pub fn authorize_url(
    accounts_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> AppResult<String> {
    let base = format!("{}/authorize", accounts_url.trim_end_matches('/'));

    let url = reqwest::Url::parse_with_params(
        &base,
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("scope", PLAYLIST_SCOPES),
            ("redirect_uri", redirect_uri),
            ("state", state),
        ],
    )
    .map_err(|e| AppError::Internal(format!("Invalid Spotify accounts URL: {}", e)))?;

    Ok(url.into())
}
