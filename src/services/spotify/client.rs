use crate::{
    cached,
    config::ClientCredentials,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        AccessToken, AddTracksRequest, NewPlaylist, RecommendationsResponse, SearchResponse,
        SpotifyPlaylist, SpotifyUser, TokenResponse, Track,
    },
    services::spotify::SpotifyApi,
};
use reqwest::{Client as HttpClient, Response};

const SEARCH_CACHE_TTL: u64 = 86400; // 1 day
/// Tokens are dropped from the cache this long before Spotify expires them
const TOKEN_EXPIRY_MARGIN: u64 = 60;
/// Spotify accepts at most 100 URIs per add-items request
const MAX_URIS_PER_REQUEST: usize = 100;

#[derive(Clone)]
pub struct SpotifyClient {
    http_client: HttpClient,
    api_url: String,
    accounts_url: String,
    cache: Option<Cache>,
}

impl SpotifyClient {
    pub fn new(
        http_client: HttpClient,
        api_url: impl Into<String>,
        accounts_url: impl Into<String>,
        cache: Option<Cache>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            accounts_url: accounts_url.into().trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Posts a grant to the token endpoint with the app's Basic credentials
    async fn request_token(
        &self,
        credentials: &ClientCredentials,
        form: &[(&str, &str)],
    ) -> AppResult<(reqwest::StatusCode, TokenResponse)> {
        let url = format!("{}/api/token", self.accounts_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body: TokenResponse = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Invalid Spotify token response: {}", e))
        })?;

        if let Some(error) = &body.error {
            tracing::warn!(
                status = %status,
                error = %error,
                description = body.error_description.as_deref().unwrap_or(""),
                "Spotify token endpoint returned an error"
            );
        }

        Ok((status, body))
    }

    async fn refresh_uncached(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> AppResult<AccessToken> {
        let (status, body) = self
            .request_token(
                credentials,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ],
            )
            .await?;

        let token = body
            .into_token()
            .filter(|_| status.is_success())
            .ok_or_else(|| AppError::ExternalApi("Failed to refresh Spotify token".to_string()))?;

        tracing::info!(expires_in = token.expires_in, "Refreshed Spotify access token");

        Ok(token)
    }

    async fn search_uncached(&self, access_token: &str, query: &str) -> AppResult<Option<Track>> {
        let url = format!("{}/v1/search", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("q", query), ("type", "track"), ("limit", "1")])
            .send()
            .await?;

        let body: SearchResponse = ensure_success(response, "search").await?.json().await?;
        Ok(body.tracks.and_then(|page| page.items.into_iter().next()))
    }

    /// Only answers Spotify actually gave are cached; failed lookups stay errors
    async fn search_cached(&self, access_token: &str, query: &str) -> AppResult<Option<Track>> {
        cached!(
            self.cache.as_ref(),
            CacheKey::TrackSearch(query.to_string()),
            SEARCH_CACHE_TTL,
            async { self.search_uncached(access_token, query).await }
        )
    }
}

/// Maps a non-2xx Spotify response to an error carrying its body
async fn ensure_success(response: Response, action: &str) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::ExternalApi(format!(
        "Spotify {} returned status {}: {}",
        action, status, body
    )))
}

#[async_trait::async_trait]
impl SpotifyApi for SpotifyClient {
    async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        redirect_uri: &str,
    ) -> AppResult<AccessToken> {
        let (_, body) = self
            .request_token(
                credentials,
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", redirect_uri),
                ],
            )
            .await?;

        body.into_token()
            .ok_or_else(|| AppError::ExternalApi("Spotify token exchange failed".to_string()))
    }

    async fn refresh_access_token(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> AppResult<AccessToken> {
        // TTL depends on the token itself, so this cannot go through `cached!`
        let key = CacheKey::AccessToken(credentials.client_id.clone());

        if let Some(cache) = &self.cache {
            if let Some(token) = cache.get_from_cache::<AccessToken>(&key).await? {
                return Ok(token);
            }
        }

        let token = self.refresh_uncached(credentials, refresh_token).await?;

        if let Some(cache) = &self.cache {
            let ttl = token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN);
            cache.set_in_background(&key, &token, ttl);
        }

        Ok(token)
    }

    async fn current_user(&self, access_token: &str) -> AppResult<SpotifyUser> {
        let url = format!("{}/v1/me", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let user: SpotifyUser = ensure_success(response, "profile lookup").await?.json().await?;
        Ok(user)
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> AppResult<SpotifyPlaylist> {
        let url = format!("{}/v1/users/{}/playlists", self.api_url, user_id);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(playlist)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = %status, body = %body, "Spotify create playlist response");

        if !status.is_success() {
            return Err(AppError::ExternalApi(format!(
                "Spotify playlist creation returned status {}: {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            AppError::ExternalApi(format!("Invalid Spotify playlist response: {}", e))
        })
    }

    async fn search_track(&self, access_token: &str, query: &str) -> AppResult<Option<Track>> {
        match self.search_cached(access_token, query).await {
            Err(AppError::ExternalApi(message)) => {
                tracing::warn!(query = %query, error = %message, "Spotify search failed");
                Ok(None)
            }
            result => result,
        }
    }

    async fn recommend_track(
        &self,
        access_token: &str,
        seed_artist: &str,
    ) -> AppResult<Option<Track>> {
        let url = format!("{}/v1/recommendations", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("limit", "1"), ("seed_artists", seed_artist)])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(
                seed_artist = %seed_artist,
                status = %response.status(),
                "Spotify recommendations failed"
            );
            return Ok(None);
        }

        let body: RecommendationsResponse = response.json().await?;
        Ok(body.tracks.into_iter().next())
    }

    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> AppResult<()> {
        let url = format!("{}/v1/playlists/{}/tracks", self.api_url, playlist_id);

        for chunk in uris.chunks(MAX_URIS_PER_REQUEST) {
            let response = self
                .http_client
                .post(&url)
                .bearer_auth(access_token)
                .json(&AddTracksRequest { uris: chunk })
                .send()
                .await?;

            ensure_success(response, "add tracks").await?;
        }

        tracing::info!(playlist_id = %playlist_id, tracks = uris.len(), "Tracks added to playlist");

        Ok(())
    }
}
