//! Playlist models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::song::SongSummary;

/// A raw playlist row, used for ownership checks.
#[derive(Debug, Clone, FromRow)]
pub struct PlaylistRecord {
    pub id: String,
    pub name: String,
    pub owner: String,
}

/// A playlist as listed for a user: owned or collaborated, with the
/// owner's username.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub username: String,
}

/// The composite playlist view: header plus member songs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistWithSongs {
    pub id: String,
    pub name: String,
    pub username: String,
    pub songs: Vec<SongSummary>,
}

/// One activity-log entry as displayed: usernames and song titles are
/// joined in, ordered by time ascending.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PlaylistActivity {
    pub username: String,
    pub title: String,
    pub action: String,
    pub time: DateTime<Utc>,
}

/// Playlist membership transitions recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    Add,
    Delete,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Add => "add",
            ActivityAction::Delete => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_action_str() {
        assert_eq!(ActivityAction::Add.as_str(), "add");
        assert_eq!(ActivityAction::Delete.as_str(), "delete");
    }
}
