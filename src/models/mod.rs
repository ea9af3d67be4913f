//! Domain models shared by the API server and the export consumer

pub mod album;
pub mod playlist;
pub mod song;
pub mod user;

pub use album::Album;
pub use playlist::{
    ActivityAction, PlaylistActivity, PlaylistRecord, PlaylistSummary, PlaylistWithSongs,
};
pub use song::{Song, SongSummary};
pub use user::User;
