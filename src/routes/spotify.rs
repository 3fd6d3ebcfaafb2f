use axum::{
    extract::{Query, State},
    response::Redirect,
    Extension,
};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{CallbackQuery, DraftQuery},
    routes::AppState,
    services::{playlists, spotify::authorize_url},
};

const LOGIN_PATH: &str = "/api/v1/spotify/login";

/// Relative login URL for a draft, with the id query-encoded
pub fn login_path(temp_id: &str) -> AppResult<String> {
    with_query(LOGIN_PATH, "id", temp_id)
}

/// Where the visitor lands once their playlist exists
pub fn success_path(redirect_path: &str, playlist_id: &str) -> AppResult<String> {
    with_query(redirect_path, "playlist", playlist_id)
}

/// Appends a single query-encoded parameter to `path`
fn with_query(path: &str, key: &str, value: &str) -> AppResult<String> {
    let url = reqwest::Url::parse_with_params("http://localhost/", &[(key, value)])
        .map_err(|e| AppError::Internal(format!("Invalid redirect URL: {}", e)))?;

    Ok(format!("{}?{}", path, url.query().unwrap_or_default()))
}

/// Sends the visitor to Spotify's consent screen, carrying the draft id as `state`
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<DraftQuery>,
) -> AppResult<Redirect> {
    let temp_id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing playlist ID".to_string()))?;

    let url = authorize_url(
        &state.config.spotify_accounts_url,
        &state.config.spotify_client_id,
        &state.config.spotify_redirect_uri,
        &temp_id,
    )?;

    Ok(Redirect::temporary(&url))
}

/// OAuth callback: builds the playlist, then hands the visitor to the success page
pub async fn callback(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Redirect> {
    let (Some(code), Some(temp_id)) = (
        query.code.filter(|c| !c.is_empty()),
        query.state.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::InvalidInput(
            "Missing Spotify code or tempId".to_string(),
        ));
    };

    tracing::info!(request_id = %request_id, temp_id = %temp_id, "Processing Spotify callback");

    let playlist_id = playlists::complete_authorization(
        state.spotify.as_ref(),
        state.store.as_ref(),
        &state.config.spotify_app(),
        state.config.fallback_seed_artist(),
        &code,
        &temp_id,
    )
    .await?;

    let location = success_path(&state.config.success_redirect_path, &playlist_id)?;
    Ok(Redirect::temporary(&location))
}
