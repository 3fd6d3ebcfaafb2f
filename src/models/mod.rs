mod api;
mod draft;
mod song;
mod spotify;

pub use api::{
    CallbackQuery, DraftQuery, GenerateRequest, GenerateResponse, PublicSyncResponse,
    SyncRequest, SyncResponse,
};
pub use draft::{parse_minutes, PlaylistDraft, PlaylistRecord};
pub use song::{parse_suggestions, Song};
pub use spotify::{AccessToken, ArtistRef, ExternalUrls, NewPlaylist, SpotifyPlaylist, SpotifyUser, Track};
pub(crate) use spotify::{
    AddTracksRequest, RecommendationsResponse, SearchResponse, TokenResponse,
};
