//! Song models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A full song row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<i32>,
    #[serde(rename = "albumId")]
    pub album_id: Option<String>,
}

/// The projection used by song listings, playlist views and exports.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SongSummary {
    pub id: String,
    pub title: String,
    pub performer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_id_field_name() {
        let song = Song {
            id: "song-x".into(),
            title: "Clocks".into(),
            year: 2002,
            genre: "Alternative".into(),
            performer: "Coldplay".into(),
            duration: Some(307),
            album_id: Some("album-x".into()),
        };

        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["albumId"], "album-x");
        assert!(json.get("album_id").is_none());
    }
}
