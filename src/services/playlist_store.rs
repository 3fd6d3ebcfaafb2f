/// Client for the external playlist API that persists drafts and final records
///
/// The API is opaque to this service: drafts go in through `/prepare-playlist`
/// and come back from `/get-playlist`, finished playlists are written with
/// `/save-playlist`.
use crate::{
    error::{AppError, AppResult},
    models::{PlaylistDraft, PlaylistRecord},
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Stores a draft and returns its temporary id
    async fn prepare(&self, draft: &PlaylistDraft) -> AppResult<String>;

    /// Loads a draft, `None` if it does not exist or has no songs
    async fn fetch(&self, temp_id: &str) -> AppResult<Option<PlaylistDraft>>;

    /// Persists the final playlist record
    async fn save(&self, record: &PlaylistRecord) -> AppResult<()>;
}

#[derive(Clone)]
pub struct HttpPlaylistStore {
    http_client: HttpClient,
    api_url: String,
}

impl HttpPlaylistStore {
    pub fn new(http_client: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl PlaylistStore for HttpPlaylistStore {
    async fn prepare(&self, draft: &PlaylistDraft) -> AppResult<String> {
        let url = format!("{}/prepare-playlist", self.api_url);

        let response = self.http_client.post(&url).json(draft).send().await?;
        let status = response.status();

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct PrepareResponse {
            #[serde(default)]
            temp_id: Option<String>,
        }

        let body: Option<PrepareResponse> = response.json().await.ok();
        let temp_id = body.and_then(|b| b.temp_id).filter(|id| !id.is_empty());

        match temp_id {
            Some(temp_id) if status.is_success() => {
                tracing::info!(temp_id = %temp_id, songs = draft.songs.len(), "Draft prepared");
                Ok(temp_id)
            }
            _ => {
                tracing::error!(status = %status, "Playlist API did not return a tempId");
                Err(AppError::ExternalApi(
                    "Failed to save playlist. Try again.".to_string(),
                ))
            }
        }
    }

    async fn fetch(&self, temp_id: &str) -> AppResult<Option<PlaylistDraft>> {
        let url = format!("{}/get-playlist", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("id", temp_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(temp_id = %temp_id, status = %response.status(), "Draft lookup failed");
            return Ok(None);
        }

        let body: serde_json::Value = response.json().await?;
        if body.get("songs").map_or(true, serde_json::Value::is_null) {
            tracing::warn!(temp_id = %temp_id, "Draft has no songs");
            return Ok(None);
        }

        let draft: PlaylistDraft = serde_json::from_value(body).map_err(|e| {
            AppError::ExternalApi(format!("Invalid playlist draft {}: {}", temp_id, e))
        })?;

        Ok(Some(draft))
    }

    async fn save(&self, record: &PlaylistRecord) -> AppResult<()> {
        let url = format!("{}/save-playlist", self.api_url);

        let response = self.http_client.post(&url).json(record).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Playlist API returned status {}: {}",
                status, body
            )));
        }

        tracing::info!(
            user_id = %record.user_id,
            playlist_id = %record.playlist_id,
            "Playlist record saved"
        );

        Ok(())
    }
}
