use serde::{de, Deserialize, Deserializer, Serialize};
use std::time::Duration;

use super::Song;

/// Playlist request stored by the playlist API before the visitor authorizes Spotify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDraft {
    #[serde(default)]
    pub prompt: String,
    #[serde(deserialize_with = "deserialize_songs")]
    pub songs: Vec<Song>,
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub duration: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub taste: String,
}

impl PlaylistDraft {
    /// Requested playlist length, if `duration` starts with a number of minutes
    ///
    /// A length too large to represent in seconds means no target.
    pub fn target_duration(&self) -> Option<Duration> {
        parse_minutes(&self.duration)
            .and_then(|minutes| minutes.checked_mul(60))
            .map(Duration::from_secs)
    }
}

/// Final record written once the Spotify playlist exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRecord {
    pub user_id: String,
    pub playlist_id: String,
    pub prompt: String,
    pub songs: Vec<Song>,
    pub duration: String,
    pub taste: String,
    pub spotify_url: String,
}

/// Reads the leading whole number of minutes, ignoring anything after it
pub fn parse_minutes(value: &str) -> Option<u64> {
    let value = value.trim();
    let digits = value.bytes().take_while(u8::is_ascii_digit).count();
    value[..digits].parse().ok()
}

/// The encodings `songs` has been stored with over time
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSongs {
    Plain(Vec<Song>),
    Attribute(Vec<AttributeSong>),
    Encoded(String),
}

/// DynamoDB attribute-value form: `{"M": {"title": {"S": ..}, "artist": {"S": ..}}}`
#[derive(Deserialize)]
struct AttributeSong {
    #[serde(rename = "M")]
    map: AttributeSongFields,
}

#[derive(Deserialize)]
struct AttributeSongFields {
    title: AttributeString,
    artist: AttributeString,
}

#[derive(Deserialize)]
struct AttributeString {
    #[serde(rename = "S")]
    value: String,
}

fn deserialize_songs<'de, D>(deserializer: D) -> Result<Vec<Song>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = StoredSongs::deserialize(deserializer)
        .map_err(|_| de::Error::custom("songs is not a valid array"))?;

    match stored {
        StoredSongs::Plain(songs) => Ok(songs),
        StoredSongs::Attribute(items) => Ok(items
            .into_iter()
            .map(|item| Song::new(item.map.title.value, item.map.artist.value))
            .collect()),
        StoredSongs::Encoded(json) => serde_json::from_str(&json)
            .map_err(|_| de::Error::custom("songs is not a valid array")),
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Minutes {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Minutes>::deserialize(deserializer)? {
        Some(Minutes::Text(text)) => text,
        Some(Minutes::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
