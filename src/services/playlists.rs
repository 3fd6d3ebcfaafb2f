use std::time::Instant;

use crate::{
    config::{SharedAccount, SpotifyApp},
    error::{AppError, AppResult},
    models::{
        parse_suggestions, GenerateRequest, NewPlaylist, PlaylistDraft, PlaylistRecord, Song,
    },
    services::{
        playlist_store::PlaylistStore,
        spotify::SpotifyApi,
        suggestions::SongSuggester,
        track_matching::{match_tracks, MatchStrategy},
    },
};

/// Owner recorded for playlists published through the shared account
pub const SHARED_USER_ID: &str = "shared-public";
const DEFAULT_PLAYLIST_NAME: &str = "Melofy Playlist";

/// A stored draft together with the songs it was created from
#[derive(Debug, Clone)]
pub struct PreparedDraft {
    pub temp_id: String,
    pub songs: Vec<Song>,
}

/// Asks the suggestion backend for songs and stores them as a draft
pub async fn generate_draft(
    suggester: &dyn SongSuggester,
    store: &dyn PlaylistStore,
    request: &GenerateRequest,
) -> AppResult<PreparedDraft> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::InvalidInput("Prompt cannot be empty".to_string()));
    }

    let text = suggester.suggest(request).await?;
    let songs = parse_suggestions(&text);

    if songs.is_empty() {
        return Err(AppError::ExternalApi(
            "Suggestion service returned no songs".to_string(),
        ));
    }

    tracing::info!(songs = songs.len(), "Parsed song suggestions");

    let draft = PlaylistDraft {
        prompt: request.prompt.clone(),
        songs,
        duration: request.duration.clone().unwrap_or_default(),
        taste: request.taste.clone().unwrap_or_default(),
    };

    let temp_id = store.prepare(&draft).await?;

    Ok(PreparedDraft {
        temp_id,
        songs: draft.songs,
    })
}

/// Finishes the visitor's OAuth round trip by building their playlist
///
/// Returns the id of the playlist created in the visitor's account.
pub async fn complete_authorization(
    spotify: &dyn SpotifyApi,
    store: &dyn PlaylistStore,
    app: &SpotifyApp,
    seed_artist: Option<&str>,
    code: &str,
    temp_id: &str,
) -> AppResult<String> {
    let start = Instant::now();

    // 1. Exchange the authorization code
    let token = spotify
        .exchange_code(&app.credentials, code, &app.redirect_uri)
        .await?;

    // 2. Load the draft
    let draft = load_draft(store, temp_id).await?;

    // 3. Whose account are we writing to
    let user = spotify.current_user(&token.access_token).await?;

    // 4. Create the playlist
    let new_playlist = NewPlaylist {
        name: format!("Melofy - {}", draft.prompt),
        description: format!("Mood: {}", draft.taste),
        public: false,
    };
    let created = spotify
        .create_playlist(&token.access_token, &user.id, &new_playlist)
        .await?;
    let (playlist_id, spotify_url) = created
        .id_and_url()
        .ok_or_else(|| AppError::ExternalApi("Failed to create playlist".to_string()))?;

    tracing::info!(temp_id = %temp_id, playlist_id = %playlist_id, "Created visitor playlist");

    // 5. Match tracks up to the requested length
    let strategy = MatchStrategy::Fallback {
        seed_artist: seed_artist.map(str::to_string),
    };
    let matched = match_tracks(
        spotify,
        &token.access_token,
        &draft.songs,
        &strategy,
        draft.target_duration(),
    )
    .await?;

    // 6. Attach them
    if !matched.uris.is_empty() {
        spotify
            .add_tracks(&token.access_token, playlist_id, &matched.uris)
            .await?;
    }

    // 7. Persist the final record
    let record = PlaylistRecord {
        user_id: user.id.clone(),
        playlist_id: playlist_id.to_string(),
        prompt: draft.prompt,
        songs: draft.songs,
        duration: draft.duration,
        taste: draft.taste,
        spotify_url: spotify_url.to_string(),
    };
    store.save(&record).await?;

    tracing::info!(
        temp_id = %temp_id,
        playlist_id = %playlist_id,
        tracks = matched.uris.len(),
        processing_time_ms = start.elapsed().as_millis(),
        "Spotify callback completed"
    );

    Ok(record.playlist_id)
}

/// Publishes a draft as a public playlist owned by the shared account
///
/// Returns the playlist's public URL.
pub async fn publish_shared(
    spotify: &dyn SpotifyApi,
    store: &dyn PlaylistStore,
    account: Option<&SharedAccount>,
    temp_id: &str,
) -> AppResult<String> {
    let draft = load_draft(store, temp_id).await?;

    let account = account.ok_or_else(|| {
        AppError::Internal("Missing shared Spotify credentials".to_string())
    })?;

    let token = spotify
        .refresh_access_token(&account.credentials, &account.refresh_token)
        .await?;

    let prompt = if draft.prompt.trim().is_empty() {
        DEFAULT_PLAYLIST_NAME
    } else {
        draft.prompt.as_str()
    };

    let new_playlist = NewPlaylist {
        name: format!("🎵 {}", prompt),
        description: format!(
            "Taste: {} | Duration: {} min | Created by Melofy",
            draft.taste, draft.duration
        ),
        public: true,
    };

    let created = spotify
        .create_playlist(&token.access_token, &account.user_id, &new_playlist)
        .await?;
    let (playlist_id, public_url) = created
        .id_and_url()
        .ok_or_else(|| AppError::Internal("Failed to create Spotify playlist".to_string()))?;

    let matched = match_tracks(
        spotify,
        &token.access_token,
        &draft.songs,
        &MatchStrategy::Exact,
        None,
    )
    .await?;

    if !matched.uris.is_empty() {
        spotify
            .add_tracks(&token.access_token, playlist_id, &matched.uris)
            .await?;
    }

    let record = PlaylistRecord {
        user_id: SHARED_USER_ID.to_string(),
        playlist_id: temp_id.to_string(),
        prompt: prompt.to_string(),
        songs: draft.songs.clone(),
        duration: draft.duration.clone(),
        taste: draft.taste.clone(),
        spotify_url: public_url.to_string(),
    };
    store.save(&record).await?;

    tracing::info!(
        temp_id = %temp_id,
        playlist_id = %playlist_id,
        tracks = matched.uris.len(),
        "Published shared playlist"
    );

    Ok(record.spotify_url)
}

/// Adds songs to an existing playlist using the caller's token
///
/// Returns how many tracks were added.
pub async fn sync_tracks(
    spotify: &dyn SpotifyApi,
    access_token: &str,
    playlist_id: &str,
    songs: &[Song],
) -> AppResult<usize> {
    let matched = match_tracks(spotify, access_token, songs, &MatchStrategy::Exact, None).await?;

    if matched.uris.is_empty() {
        return Err(AppError::NotFound("No valid tracks found".to_string()));
    }

    spotify
        .add_tracks(access_token, playlist_id, &matched.uris)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, playlist_id = %playlist_id, "Adding tracks failed");
            AppError::Internal("Failed to add tracks to playlist".to_string())
        })?;

    Ok(matched.uris.len())
}

async fn load_draft(store: &dyn PlaylistStore, temp_id: &str) -> AppResult<PlaylistDraft> {
    store
        .fetch(temp_id)
        .await?
        .filter(|draft| !draft.songs.is_empty())
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))
}
