use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        DraftQuery, GenerateRequest, GenerateResponse, PublicSyncResponse, SyncRequest,
        SyncResponse,
    },
    routes::{spotify::login_path, AppState},
    services::playlists,
};

/// Generates song suggestions for a vibe and stores them as a draft
pub async fn generate(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        taste = request.taste.as_deref().unwrap_or(""),
        "Processing generate request"
    );

    let prepared =
        playlists::generate_draft(state.suggester.as_ref(), state.store.as_ref(), &request)
            .await?;

    Ok(Json(GenerateResponse {
        login_url: login_path(&prepared.temp_id)?,
        temp_id: prepared.temp_id,
        songs: prepared.songs,
    }))
}

/// Publishes a draft through the shared Spotify account
pub async fn public_sync(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<DraftQuery>,
) -> AppResult<Json<PublicSyncResponse>> {
    let temp_id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing playlist ID".to_string()))?;

    tracing::info!(request_id = %request_id, temp_id = %temp_id, "Processing public sync");

    let account = state.config.shared_account();
    let public_spotify_url = playlists::publish_shared(
        state.spotify.as_ref(),
        state.store.as_ref(),
        account.as_ref(),
        &temp_id,
    )
    .await?;

    Ok(Json(PublicSyncResponse { public_spotify_url }))
}

/// Adds songs to an existing playlist with a caller-provided token
pub async fn sync(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> AppResult<Json<SyncResponse>> {
    let missing = || AppError::InvalidInput("Missing required data".to_string());

    let Json(request) = payload.map_err(|_| missing())?;
    let (Some(playlist_id), Some(access_token), Some(songs)) =
        (request.playlist_id, request.access_token, request.songs)
    else {
        return Err(missing());
    };
    if playlist_id.is_empty() || access_token.is_empty() {
        return Err(missing());
    }

    tracing::info!(
        request_id = %request_id,
        playlist_id = %playlist_id,
        songs = songs.len(),
        "Processing track sync"
    );

    let added =
        playlists::sync_tracks(state.spotify.as_ref(), &access_token, &playlist_id, &songs).await?;

    Ok(Json(SyncResponse {
        success: true,
        added,
    }))
}
