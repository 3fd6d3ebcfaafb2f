use serde::{Deserialize, Serialize};

const UNKNOWN_ARTIST: &str = "Unknown";

/// A song suggestion, before it has been matched to a Spotify track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
}

impl Song {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// Parses the free-text playlist produced by the suggestion backend
///
/// Only lines with a spaced hyphen are considered songs, e.g.
/// `"1. Midnight City - M83"`. The first hyphen or en dash separates title
/// from artist.
pub fn parse_suggestions(text: &str) -> Vec<Song> {
    text.lines()
        .filter(|line| line.contains(" - "))
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<Song> {
    let (title, artist) = split_title_artist(line);

    let title = strip_list_number(title.trim()).trim();
    if title.is_empty() {
        return None;
    }

    let artist = match artist.map(str::trim) {
        Some(artist) if !artist.is_empty() => artist,
        _ => UNKNOWN_ARTIST,
    };

    Some(Song::new(title, artist))
}

/// Splits on whichever separator comes first
fn split_title_artist(line: &str) -> (&str, Option<&str>) {
    let separator = [" - ", " – "]
        .into_iter()
        .filter_map(|sep| line.find(sep).map(|idx| (idx, sep.len())))
        .min_by_key(|(idx, _)| *idx);

    match separator {
        Some((idx, len)) => {
            let rest = &line[idx + len..];
            // Only the second segment is the artist, as in "Title - Artist - Album"
            let artist = [" - ", " – "]
                .into_iter()
                .filter_map(|sep| rest.find(sep))
                .min()
                .map_or(rest, |end| &rest[..end]);
            (&line[..idx], Some(artist))
        }
        None => (line, None),
    }
}

/// Removes a leading `"12. "` style list number
fn strip_list_number(title: &str) -> &str {
    let digits = title.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return title;
    }

    match title[digits..].strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => title,
    }
}
