use serde::{Deserialize, Serialize};

// ============================================================================
// Accounts service
// ============================================================================

/// Token returned by `POST /api/token`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Lenient view of the token endpoint body; errors come back as `{"error": ..}`
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    pub(crate) fn into_token(self) -> Option<AccessToken> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        Some(AccessToken {
            access_token,
            token_type: self.token_type.unwrap_or_else(default_token_type),
            expires_in: self.expires_in.unwrap_or_default(),
            refresh_token: self.refresh_token,
            scope: self.scope,
        })
    }
}

// ============================================================================
// Web API
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

/// Body of `POST /v1/users/{user_id}/playlists`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpotifyPlaylist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl SpotifyPlaylist {
    /// Playlist id and web URL, when Spotify returned both
    pub fn id_and_url(&self) -> Option<(&str, &str)> {
        let id = self.id.as_deref().filter(|id| !id.is_empty())?;
        let url = self.external_urls.spotify.as_deref().filter(|u| !u.is_empty())?;
        Some((id, url))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Paging<Track>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddTracksRequest<'a> {
    pub uris: &'a [String],
}
