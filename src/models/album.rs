//! Album model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An album row. The cover URL is set separately via the upload route and
/// stays `null` until then.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub year: i32,
    #[serde(rename = "coverUrl")]
    #[sqlx(rename = "cover")]
    pub cover_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_serializes_as_cover_url() {
        let album = Album {
            id: "album-x".into(),
            name: "Viva la Vida".into(),
            year: 2008,
            cover_url: None,
        };

        let json = serde_json::to_value(&album).unwrap();
        assert!(json.get("coverUrl").is_some());
        assert!(json.get("cover_url").is_none());
    }
}
