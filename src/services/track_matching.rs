use std::collections::HashSet;
use std::time::Duration;

use crate::{
    error::AppResult,
    models::{Song, Track},
    services::spotify::SpotifyApi,
};

/// How hard to look for a song on Spotify
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Only `track:<title> artist:<artist>`
    Exact,
    /// Progressively looser queries, then optionally a seeded recommendation
    Fallback { seed_artist: Option<String> },
}

/// Result of matching a list of songs against Spotify
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchedTracks {
    pub uris: Vec<String>,
    pub total_duration: Duration,
    pub unmatched: Vec<Song>,
}

/// Lower-cases the title and drops everything but ASCII word characters and whitespace
pub fn clean_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Search queries for a song, strictest first
pub fn search_queries(song: &Song) -> Vec<String> {
    let title = song.title.trim();
    let candidates = [
        format!("track:{} artist:{}", title, song.artist.trim()),
        format!("track:{}", title),
        format!("track:{}", clean_title(&song.title)),
    ];

    let mut queries: Vec<String> = Vec::with_capacity(candidates.len());
    for query in candidates {
        if queries.last() != Some(&query) {
            queries.push(query);
        }
    }
    queries
}

/// Finds a playable track (one with a URI) for a song
pub async fn find_track(
    spotify: &dyn SpotifyApi,
    access_token: &str,
    song: &Song,
    strategy: &MatchStrategy,
) -> AppResult<Option<Track>> {
    let mut queries = search_queries(song);

    let seed_artist = match strategy {
        MatchStrategy::Exact => {
            queries.truncate(1);
            None
        }
        MatchStrategy::Fallback { seed_artist } => seed_artist.as_deref(),
    };

    for query in &queries {
        if let Some(track) = spotify.search_track(access_token, query).await? {
            if track.uri.is_some() {
                return Ok(Some(track));
            }
        }
    }

    if let Some(seed) = seed_artist {
        tracing::debug!(title = %song.title, artist = %song.artist, "Falling back to recommendation");
        let track = spotify.recommend_track(access_token, seed).await?;
        return Ok(track.filter(|t| t.uri.is_some()));
    }

    Ok(None)
}

/// Matches songs in order until `target` worth of music has been collected
///
/// With a target or the fallback strategy, only tracks with a known duration
/// count. Without a target, every song is tried. Repeated URIs are skipped.
pub async fn match_tracks(
    spotify: &dyn SpotifyApi,
    access_token: &str,
    songs: &[Song],
    strategy: &MatchStrategy,
    target: Option<Duration>,
) -> AppResult<MatchedTracks> {
    let mut matched = MatchedTracks::default();
    let mut seen = HashSet::new();
    let needs_duration = target.is_some() || matches!(strategy, MatchStrategy::Fallback { .. });

    for song in songs {
        let track = find_track(spotify, access_token, song, strategy).await?;

        let Some((uri, duration_ms)) = track.and_then(|t| t.uri.map(|uri| (uri, t.duration_ms)))
        else {
            tracing::warn!(title = %song.title, artist = %song.artist, "No Spotify match");
            matched.unmatched.push(song.clone());
            continue;
        };

        if needs_duration && duration_ms == 0 {
            matched.unmatched.push(song.clone());
            continue;
        }

        if !seen.insert(uri.clone()) {
            tracing::debug!(uri = %uri, "Skipping duplicate track");
            continue;
        }

        matched.uris.push(uri);
        matched.total_duration += Duration::from_millis(duration_ms);

        if target.is_some_and(|target| matched.total_duration >= target) {
            break;
        }
    }

    tracing::info!(
        matched = matched.uris.len(),
        unmatched = matched.unmatched.len(),
        total_secs = matched.total_duration.as_secs(),
        "Track matching completed"
    );

    Ok(matched)
}
