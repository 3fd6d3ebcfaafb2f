pub mod playlist_store;
pub mod playlists;
pub mod spotify;
pub mod suggestions;
pub mod track_matching;

pub use playlist_store::{HttpPlaylistStore, PlaylistStore};
pub use spotify::{SpotifyApi, SpotifyClient};
pub use suggestions::{HttpSongSuggester, SongSuggester};
