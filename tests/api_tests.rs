mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use common::{sample_draft, test_app, test_config, track, FakeSpotify, FakeStore, TestApp};
use melofy_api::routes::create_router;

fn create_test_server(app: &TestApp) -> TestServer {
    TestServer::new(create_router(app.state.clone())).unwrap()
}

fn beach_tracks() -> FakeSpotify {
    FakeSpotify::with_tracks(&[
        (
            "track:Sunset Lover artist:Petit Biscuit",
            track("spotify:track:sunset", 238_000),
        ),
        (
            "track:Island In The Sun artist:Weezer",
            track("spotify:track:island", 200_000),
        ),
        (
            "track:Kokomo artist:The Beach Boys",
            track("spotify:track:kokomo", 215_000),
        ),
    ])
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app(test_config(false), FakeSpotify::default(), FakeStore::default(), "");
    let server = create_test_server(&app);

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app(test_config(false), FakeSpotify::default(), FakeStore::default(), "");
    let server = create_test_server(&app);
    let request_id = "6f1c2f4e-8a1b-4d2c-9e3f-0a1b2c3d4e5f";

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(request_id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), request_id);
}

#[tokio::test]
async fn test_generate_creates_draft() {
    let app = test_app(
        test_config(false),
        FakeSpotify::default(),
        FakeStore::default(),
        "Here you go:\n1. Sunset Lover - Petit Biscuit\n2. Kokomo – The Beach Boys\n3. Island In The Sun - Weezer",
    );
    let server = create_test_server(&app);

    let response = server
        .post("/api/v1/playlists/generate")
        .json(&json!({
            "prompt": "sunset beach",
            "duration": "15",
            "taste": "relaxing",
            "sampleSong": "Kokomo"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["tempId"], "draft-1");
    assert_eq!(body["loginUrl"], "/api/v1/spotify/login?id=draft-1");
    assert_eq!(body["songs"].as_array().unwrap().len(), 2);
    assert_eq!(body["songs"][0]["title"], "Sunset Lover");

    let drafts = app.store.drafts.lock().unwrap();
    let draft = &drafts["draft-1"];
    assert_eq!(draft.duration, "15");
    assert_eq!(draft.taste, "relaxing");
}

#[tokio::test]
async fn test_generate_rejects_blank_prompt() {
    let app = test_app(test_config(false), FakeSpotify::default(), FakeStore::default(), "a - b");
    let server = create_test_server(&app);

    let response = server
        .post("/api/v1/playlists/generate")
        .json(&json!({ "prompt": "   " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_rejects_malformed_body() {
    let app = test_app(test_config(false), FakeSpotify::default(), FakeStore::default(), "a - b");
    let server = create_test_server(&app);

    let response = server
        .post("/api/v1/playlists/generate")
        .json(&json!({ "duration": "10" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_requires_id() {
    let app = test_app(test_config(false), FakeSpotify::default(), FakeStore::default(), "");
    let server = create_test_server(&app);

    let response = server.get("/api/v1/spotify/login").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing playlist ID");
}

#[tokio::test]
async fn test_login_redirects_to_spotify() {
    let app = test_app(test_config(false), FakeSpotify::default(), FakeStore::default(), "");
    let server = create_test_server(&app);

    let response = server
        .get("/api/v1/spotify/login")
        .add_query_param("id", "draft-7")
        .await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    let location = response.header("location");
    let location = location.to_str().unwrap();
    assert!(location.starts_with("https://accounts.spotify.test/authorize?"));
    assert!(location.contains("state=draft-7"));
    assert!(location.contains("client_id=client"));
    assert!(location.contains("response_type=code"));
}

#[tokio::test]
async fn test_callback_requires_code_and_state() {
    let app = test_app(test_config(false), FakeSpotify::default(), FakeStore::default(), "");
    let server = create_test_server(&app);

    let response = server
        .get("/api/v1/spotify/callback")
        .add_query_param("code", "auth-code")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing Spotify code or tempId");
}

#[tokio::test]
async fn test_callback_builds_playlist_and_redirects() {
    // 5 minute target: two tracks (238s + 200s) are enough
    let app = test_app(
        test_config(false),
        beach_tracks(),
        FakeStore::with_draft("draft-1", sample_draft("5")),
        "",
    );
    let server = create_test_server(&app);

    let response = server
        .get("/api/v1/spotify/callback")
        .add_query_param("code", "auth-code")
        .add_query_param("state", "draft-1")
        .await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "/spotify-success?playlist=pl-1");

    let created = app.spotify.created.lock().unwrap();
    assert_eq!(created[0].0, "listener");
    assert_eq!(created[0].1.name, "Melofy - sunset beach");
    assert!(!created[0].1.public);

    let added = app.spotify.added.lock().unwrap();
    assert_eq!(
        added[0],
        (
            "pl-1".to_string(),
            vec![
                "spotify:track:sunset".to_string(),
                "spotify:track:island".to_string()
            ]
        )
    );

    let saved = app.store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].user_id, "listener");
    assert_eq!(saved[0].playlist_id, "pl-1");
    assert_eq!(saved[0].spotify_url, "https://open.spotify.com/playlist/pl-1");
}

#[tokio::test]
async fn test_callback_uses_fallback_queries() {
    let spotify = FakeSpotify::with_tracks(&[(
        "track:Kokomo",
        track("spotify:track:kokomo", 215_000),
    )]);
    let app = test_app(
        test_config(false),
        spotify,
        FakeStore::with_draft("draft-1", sample_draft("")),
        "",
    );
    let server = create_test_server(&app);

    server
        .get("/api/v1/spotify/callback")
        .add_query_param("code", "auth-code")
        .add_query_param("state", "draft-1")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    let searches = app.spotify.searches.lock().unwrap();
    assert!(searches.contains(&"track:Kokomo artist:The Beach Boys".to_string()));
    assert!(searches.contains(&"track:Kokomo".to_string()));

    let added = app.spotify.added.lock().unwrap();
    assert_eq!(added[0].1, vec!["spotify:track:kokomo".to_string()]);
}

#[tokio::test]
async fn test_callback_unknown_draft() {
    let app = test_app(test_config(false), beach_tracks(), FakeStore::default(), "");
    let server = create_test_server(&app);

    let response = server
        .get("/api/v1/spotify/callback")
        .add_query_param("code", "auth-code")
        .add_query_param("state", "missing")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(app.spotify.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_callback_token_failure() {
    let app = test_app(
        test_config(false),
        beach_tracks(),
        FakeStore::with_draft("draft-1", sample_draft("5")),
        "",
    );
    let server = create_test_server(&app);

    let response = server
        .get("/api/v1/spotify/callback")
        .add_query_param("code", "bad-code")
        .add_query_param("state", "draft-1")
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "Spotify token exchange failed");
}

#[tokio::test]
async fn test_public_sync_without_shared_account() {
    let app = test_app(
        test_config(false),
        beach_tracks(),
        FakeStore::with_draft("draft-1", sample_draft("30")),
        "",
    );
    let server = create_test_server(&app);

    let response = server
        .get("/api/v1/playlists/public-sync")
        .add_query_param("id", "draft-1")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing shared Spotify credentials");
}

#[tokio::test]
async fn test_public_sync_publishes_playlist() {
    let app = test_app(
        test_config(true),
        beach_tracks(),
        FakeStore::with_draft("draft-1", sample_draft("30")),
        "",
    );
    let server = create_test_server(&app);

    let response = server
        .get("/api/v1/playlists/public-sync")
        .add_query_param("id", "draft-1")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["publicSpotifyUrl"],
        "https://open.spotify.com/playlist/pl-1"
    );

    let created = app.spotify.created.lock().unwrap();
    assert_eq!(created[0].0, "melofy-shared");
    assert!(created[0].1.public);

    // No duration cap for shared playlists
    let added = app.spotify.added.lock().unwrap();
    assert_eq!(added[0].1.len(), 3);

    let saved = app.store.saved.lock().unwrap();
    assert_eq!(saved[0].user_id, "shared-public");
    assert_eq!(saved[0].playlist_id, "draft-1");
}

#[tokio::test]
async fn test_public_sync_errors() {
    let app = test_app(test_config(true), beach_tracks(), FakeStore::default(), "");
    let server = create_test_server(&app);

    server
        .get("/api/v1/playlists/public-sync")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/v1/playlists/public-sync")
        .add_query_param("id", "unknown")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Playlist not found");
}

#[tokio::test]
async fn test_sync_adds_matched_tracks() {
    let app = test_app(test_config(false), beach_tracks(), FakeStore::default(), "");
    let server = create_test_server(&app);

    let response = server
        .post("/api/v1/playlists/sync")
        .json(&json!({
            "playlistId": "existing",
            "accessToken": "caller-token",
            "songs": [
                { "title": "Kokomo", "artist": "The Beach Boys" },
                { "title": "Unknown Song", "artist": "Nobody" }
            ]
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": true, "added": 1 }));

    let added = app.spotify.added.lock().unwrap();
    assert_eq!(added[0].0, "existing");
}

#[tokio::test]
async fn test_sync_missing_data() {
    let app = test_app(test_config(false), beach_tracks(), FakeStore::default(), "");
    let server = create_test_server(&app);

    for payload in [
        json!({ "accessToken": "t", "songs": [] }),
        json!({ "playlistId": "p", "songs": [] }),
        json!({ "playlistId": "p", "accessToken": "t" }),
        json!({ "playlistId": "p", "accessToken": "t", "songs": "not-a-list" }),
    ] {
        let response = server.post("/api/v1/playlists/sync").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Missing required data");
    }
}

#[tokio::test]
async fn test_sync_no_matches() {
    let app = test_app(test_config(false), FakeSpotify::default(), FakeStore::default(), "");
    let server = create_test_server(&app);

    let response = server
        .post("/api/v1/playlists/sync")
        .json(&json!({
            "playlistId": "existing",
            "accessToken": "caller-token",
            "songs": [{ "title": "Nothing", "artist": "Nobody" }]
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "No valid tracks found");
}

#[tokio::test]
async fn test_sync_add_failure() {
    let mut spotify = beach_tracks();
    spotify.fail_add = true;
    let app = test_app(test_config(false), spotify, FakeStore::default(), "");
    let server = create_test_server(&app);

    let response = server
        .post("/api/v1/playlists/sync")
        .json(&json!({
            "playlistId": "existing",
            "accessToken": "caller-token",
            "songs": [{ "title": "Kokomo", "artist": "The Beach Boys" }]
        }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to add tracks to playlist");
}

#[tokio::test]
async fn test_wrong_method_rejected() {
    let app = test_app(test_config(false), FakeSpotify::default(), FakeStore::default(), "");
    let server = create_test_server(&app);

    server
        .get("/api/v1/playlists/sync")
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_public_sync_draft_without_songs() {
    let mut draft = sample_draft("30");
    draft.songs.clear();
    let app = test_app(
        test_config(true),
        beach_tracks(),
        FakeStore::with_draft("draft-1", draft),
        "",
    );
    let server = create_test_server(&app);

    let response = server
        .get("/api/v1/playlists/public-sync")
        .add_query_param("id", "draft-1")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(app.spotify.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_callback_with_oversized_duration_adds_every_match() {
    let app = test_app(
        test_config(false),
        beach_tracks(),
        FakeStore::with_draft("draft-1", sample_draft("307445734561825861")),
        "",
    );
    let server = create_test_server(&app);

    let response = server
        .get("/api/v1/spotify/callback")
        .add_query_param("code", "auth-code")
        .add_query_param("state", "draft-1")
        .await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    let added = app.spotify.added.lock().unwrap();
    assert_eq!(added[0].1.len(), 3);
}
