use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Redis connection URL. Caching is disabled when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Base URL of the playlist API (song generation and draft/record storage)
    pub playlist_api_url: String,

    /// Spotify application used for the per-user OAuth flow
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,

    #[serde(default = "default_spotify_api_url")]
    pub spotify_api_url: String,

    #[serde(default = "default_spotify_accounts_url")]
    pub spotify_accounts_url: String,

    /// Shared account that owns publicly published playlists
    #[serde(default)]
    pub public_spotify_client_id: Option<String>,
    #[serde(default)]
    pub public_spotify_client_secret: Option<String>,
    #[serde(default)]
    pub public_spotify_refresh_token: Option<String>,
    #[serde(default)]
    pub public_spotify_user_id: Option<String>,

    /// Frontend path the OAuth callback redirects to once the playlist exists
    #[serde(default = "default_success_redirect_path")]
    pub success_redirect_path: String,

    /// Artist seed for the recommendation fallback. Empty disables it.
    #[serde(default = "default_fallback_seed_artist")]
    pub fallback_seed_artist: String,

    /// Timeout applied to every outbound HTTP request
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// Client id/secret pair for a Spotify application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Everything needed to run the authorization-code flow for a visitor
#[derive(Debug, Clone)]
pub struct SpotifyApp {
    pub credentials: ClientCredentials,
    pub redirect_uri: String,
}

/// The shared account publishing playlists on behalf of anonymous visitors
#[derive(Debug, Clone)]
pub struct SharedAccount {
    pub credentials: ClientCredentials,
    pub refresh_token: String,
    pub user_id: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com".to_string()
}

fn default_spotify_accounts_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_success_redirect_path() -> String {
    "/spotify-success".to_string()
}

fn default_fallback_seed_artist() -> String {
    "4NHQUGzhtTLFvgF5SZesLK".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn spotify_app(&self) -> SpotifyApp {
        SpotifyApp {
            credentials: ClientCredentials {
                client_id: self.spotify_client_id.clone(),
                client_secret: self.spotify_client_secret.clone(),
            },
            redirect_uri: self.spotify_redirect_uri.clone(),
        }
    }

    /// Returns the shared account, or `None` if any of its settings is missing
    pub fn shared_account(&self) -> Option<SharedAccount> {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

        Some(SharedAccount {
            credentials: ClientCredentials {
                client_id: non_empty(&self.public_spotify_client_id)?,
                client_secret: non_empty(&self.public_spotify_client_secret)?,
            },
            refresh_token: non_empty(&self.public_spotify_refresh_token)?,
            user_id: non_empty(&self.public_spotify_user_id)?,
        })
    }

    pub fn fallback_seed_artist(&self) -> Option<&str> {
        let seed = self.fallback_seed_artist.trim();
        (!seed.is_empty()).then_some(seed)
    }
}
