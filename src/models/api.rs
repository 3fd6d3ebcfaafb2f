use serde::{Deserialize, Serialize};

use super::Song;

/// Request to generate a playlist draft from a vibe description
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub taste: Option<String>,
    #[serde(default)]
    pub sample_song: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub temp_id: String,
    pub songs: Vec<Song>,
    /// Where to send the visitor to authorize Spotify for this draft
    pub login_url: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftQuery {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    /// Draft id round-tripped through the OAuth `state` parameter
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSyncResponse {
    pub public_spotify_url: String,
}

/// Request to attach songs to an existing playlist with a caller-supplied token
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub playlist_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub songs: Option<Vec<Song>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub added: usize,
}
