use crate::{
    error::{AppError, AppResult},
    models::GenerateRequest,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

/// Text-generation backend that proposes songs for a vibe
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SongSuggester: Send + Sync {
    /// Returns the raw playlist text, one `Title - Artist` per line
    async fn suggest(&self, request: &GenerateRequest) -> AppResult<String>;
}

/// Calls the playlist API's `/generate-playlist` endpoint
#[derive(Clone)]
pub struct HttpSongSuggester {
    http_client: HttpClient,
    api_url: String,
}

impl HttpSongSuggester {
    pub fn new(http_client: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionPayload<'a> {
    prompt: &'a str,
    duration: &'a str,
    taste: &'a str,
    sample_song: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionResponse {
    #[serde(default)]
    playlist_text: Option<String>,
}

#[async_trait::async_trait]
impl SongSuggester for HttpSongSuggester {
    async fn suggest(&self, request: &GenerateRequest) -> AppResult<String> {
        let url = format!("{}/generate-playlist", self.api_url);

        let payload = SuggestionPayload {
            prompt: &request.prompt,
            duration: request.duration.as_deref().unwrap_or_default(),
            taste: request.taste.as_deref().unwrap_or_default(),
            sample_song: request.sample_song.as_deref().unwrap_or_default(),
        };

        let response = self.http_client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Suggestion service returned status {}: {}",
                status, body
            )));
        }

        let body: SuggestionResponse = response.json().await?;
        let text = body.playlist_text.unwrap_or_default();

        tracing::debug!(chars = text.len(), "Received playlist text");

        Ok(text)
    }
}
