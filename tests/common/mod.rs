#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use melofy_api::{
    config::{ClientCredentials, Config},
    error::{AppError, AppResult},
    models::{
        AccessToken, ExternalUrls, GenerateRequest, NewPlaylist, PlaylistDraft, PlaylistRecord,
        Song, SpotifyPlaylist, SpotifyUser, Track,
    },
    routes::AppState,
    services::{PlaylistStore, SongSuggester, SpotifyApi},
};

pub fn test_config(shared_account: bool) -> Config {
    let mut vars = vec![
        ("PLAYLIST_API_URL", "https://playlists.test/prod"),
        ("SPOTIFY_CLIENT_ID", "client"),
        ("SPOTIFY_CLIENT_SECRET", "secret"),
        ("SPOTIFY_REDIRECT_URI", "http://localhost:3000/api/v1/spotify/callback"),
        ("SPOTIFY_ACCOUNTS_URL", "https://accounts.spotify.test"),
        ("FALLBACK_SEED_ARTIST", "seed-artist"),
    ];

    if shared_account {
        vars.extend([
            ("PUBLIC_SPOTIFY_CLIENT_ID", "pub-client"),
            ("PUBLIC_SPOTIFY_CLIENT_SECRET", "pub-secret"),
            ("PUBLIC_SPOTIFY_REFRESH_TOKEN", "pub-refresh"),
            ("PUBLIC_SPOTIFY_USER_ID", "melofy-shared"),
        ]);
    }

    envy::from_iter(vars.into_iter().map(|(k, v)| (k.to_string(), v.to_string()))).unwrap()
}

pub fn track(uri: &str, duration_ms: u64) -> Track {
    Track {
        uri: Some(uri.to_string()),
        name: uri.to_string(),
        duration_ms,
        artists: vec![],
    }
}

fn token(value: &str) -> AccessToken {
    AccessToken {
        access_token: value.to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        refresh_token: None,
        scope: None,
    }
}

/// In-memory Spotify: search results are looked up by exact query string
#[derive(Default)]
pub struct FakeSpotify {
    pub tracks: HashMap<String, Track>,
    pub recommendation: Option<Track>,
    pub fail_add: bool,
    pub created: Mutex<Vec<(String, NewPlaylist)>>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
    pub searches: Mutex<Vec<String>>,
}

impl FakeSpotify {
    pub fn with_tracks(tracks: &[(&str, Track)]) -> Self {
        Self {
            tracks: tracks
                .iter()
                .map(|(query, track)| (query.to_string(), track.clone()))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl SpotifyApi for FakeSpotify {
    async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        _redirect_uri: &str,
    ) -> AppResult<AccessToken> {
        if code == "bad-code" {
            return Err(AppError::ExternalApi("Spotify token exchange failed".to_string()));
        }
        Ok(token(&format!("{}-user-token", credentials.client_id)))
    }

    async fn refresh_access_token(
        &self,
        credentials: &ClientCredentials,
        _refresh_token: &str,
    ) -> AppResult<AccessToken> {
        Ok(token(&format!("{}-shared-token", credentials.client_id)))
    }

    async fn current_user(&self, _access_token: &str) -> AppResult<SpotifyUser> {
        Ok(SpotifyUser {
            id: "listener".to_string(),
            display_name: Some("Listener".to_string()),
        })
    }

    async fn create_playlist(
        &self,
        _access_token: &str,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> AppResult<SpotifyPlaylist> {
        let mut created = self.created.lock().unwrap();
        created.push((user_id.to_string(), playlist.clone()));
        let id = format!("pl-{}", created.len());

        Ok(SpotifyPlaylist {
            external_urls: ExternalUrls {
                spotify: Some(format!("https://open.spotify.com/playlist/{}", id)),
            },
            id: Some(id),
        })
    }

    async fn search_track(&self, _access_token: &str, query: &str) -> AppResult<Option<Track>> {
        self.searches.lock().unwrap().push(query.to_string());
        Ok(self.tracks.get(query).cloned())
    }

    async fn recommend_track(
        &self,
        _access_token: &str,
        _seed_artist: &str,
    ) -> AppResult<Option<Track>> {
        Ok(self.recommendation.clone())
    }

    async fn add_tracks(
        &self,
        _access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> AppResult<()> {
        if self.fail_add {
            return Err(AppError::ExternalApi("Spotify add tracks returned status 403".to_string()));
        }
        self.added
            .lock()
            .unwrap()
            .push((playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub drafts: Mutex<HashMap<String, PlaylistDraft>>,
    pub saved: Mutex<Vec<PlaylistRecord>>,
}

impl FakeStore {
    pub fn with_draft(temp_id: &str, draft: PlaylistDraft) -> Self {
        let store = Self::default();
        store
            .drafts
            .lock()
            .unwrap()
            .insert(temp_id.to_string(), draft);
        store
    }
}

#[async_trait::async_trait]
impl PlaylistStore for FakeStore {
    async fn prepare(&self, draft: &PlaylistDraft) -> AppResult<String> {
        let mut drafts = self.drafts.lock().unwrap();
        let temp_id = format!("draft-{}", drafts.len() + 1);
        drafts.insert(temp_id.clone(), draft.clone());
        Ok(temp_id)
    }

    async fn fetch(&self, temp_id: &str) -> AppResult<Option<PlaylistDraft>> {
        Ok(self.drafts.lock().unwrap().get(temp_id).cloned())
    }

    async fn save(&self, record: &PlaylistRecord) -> AppResult<()> {
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct FakeSuggester {
    pub text: String,
}

#[async_trait::async_trait]
impl SongSuggester for FakeSuggester {
    async fn suggest(&self, _request: &GenerateRequest) -> AppResult<String> {
        Ok(self.text.clone())
    }
}

pub fn sample_draft(duration: &str) -> PlaylistDraft {
    PlaylistDraft {
        prompt: "sunset beach".to_string(),
        songs: vec![
            Song::new("Sunset Lover", "Petit Biscuit"),
            Song::new("Island In The Sun", "Weezer"),
            Song::new("Kokomo", "The Beach Boys"),
        ],
        duration: duration.to_string(),
        taste: "relaxing".to_string(),
    }
}

pub struct TestApp {
    pub state: AppState,
    pub spotify: Arc<FakeSpotify>,
    pub store: Arc<FakeStore>,
}

pub fn test_app(config: Config, spotify: FakeSpotify, store: FakeStore, suggestions: &str) -> TestApp {
    let spotify = Arc::new(spotify);
    let store = Arc::new(store);
    let suggester = Arc::new(FakeSuggester {
        text: suggestions.to_string(),
    });

    let state = AppState::new(config, spotify.clone(), store.clone(), suggester);

    TestApp {
        state,
        spotify,
        store,
    }
}
