//! Playlist service: CRUD, membership, authorization gate and activity log
//!
//! Cached views: per-user listings at `playlists:<user_id>`, the composite
//! playlist+songs view at `playlistSongs:<playlist_id>` and the activity
//! log at `playlistActivities:<playlist_id>`. Every write invalidates its
//! view key before the write is acknowledged.

use chrono::Utc;

use crate::core::cache::CacheService;
use crate::core::collabs::CollaborationService;
use crate::core::Cached;
use crate::db::DbEngine;
use crate::errors::ServiceError;
use crate::models::{
    ActivityAction, PlaylistActivity, PlaylistRecord, PlaylistSummary, PlaylistWithSongs,
    SongSummary,
};
use crate::utils::ids::entity_id;

pub(crate) fn playlists_key(user_id: &str) -> String {
    format!("playlists:{user_id}")
}

fn playlist_songs_key(playlist_id: &str) -> String {
    format!("playlistSongs:{playlist_id}")
}

fn playlist_activities_key(playlist_id: &str) -> String {
    format!("playlistActivities:{playlist_id}")
}

const ACCESS_DENIED: &str = "you are not authorized to access this resource";

/// Resolve the collaborator fallback: success grants access, any failure
/// re-raises the original owner-check denial so the caller never sees a
/// secondary error from the fallback path.
fn fallback_decision(
    denied: ServiceError,
    fallback: Result<(), ServiceError>,
) -> Result<(), ServiceError> {
    match fallback {
        Ok(()) => Ok(()),
        Err(_) => Err(denied),
    }
}

#[derive(Clone)]
pub struct PlaylistService {
    db: DbEngine,
    cache: CacheService,
    collabs: CollaborationService,
}

impl PlaylistService {
    pub fn new(db: DbEngine, cache: CacheService, collabs: CollaborationService) -> Self {
        Self { db, cache, collabs }
    }

    /// Insert a playlist and return its generated id.
    pub async fn add_playlist(&self, name: &str, owner: &str) -> Result<String, ServiceError> {
        let id = entity_id("playlist");

        let row: Option<(String,)> = sqlx::query_as(
            "INSERT INTO playlists (id, name, owner) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&id)
        .bind(name)
        .bind(owner)
        .fetch_optional(self.db.pool())
        .await?;

        let id = row
            .map(|(id,)| id)
            .ok_or_else(|| ServiceError::Invariant("failed to add playlist".to_string()))?;

        self.cache.delete(&playlists_key(owner)).await?;

        Ok(id)
    }

    /// Read-through listing at `playlists:<user_id>`: playlists the user
    /// owns plus playlists they collaborate on. UNION (not UNION ALL), so a
    /// playlist is never listed twice even when the user is both.
    pub async fn get_playlists(
        &self,
        user_id: &str,
    ) -> Result<Cached<Vec<PlaylistSummary>>, ServiceError> {
        let key = playlists_key(user_id);

        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str(&raw) {
                Ok(playlists) => {
                    return Ok(Cached {
                        value: playlists,
                        from_cache: true,
                    })
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry")
                }
            }
        }

        let playlists: Vec<PlaylistSummary> = sqlx::query_as(
            "SELECT p.id, p.name, u.username FROM playlists AS p \
             INNER JOIN users AS u ON p.owner = u.id WHERE p.owner = $1 \
             UNION \
             SELECT p.id, p.name, u.username FROM collaborations AS c \
             INNER JOIN playlists AS p ON c.playlist_id = p.id \
             INNER JOIN users AS u ON p.owner = u.id WHERE c.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        self.cache
            .set(&key, &serde_json::to_string(&playlists)?)
            .await;

        Ok(Cached {
            value: playlists,
            from_cache: false,
        })
    }

    /// Uncached raw lookup, used for ownership checks and existence gates.
    pub async fn get_playlist_by_id(&self, id: &str) -> Result<PlaylistRecord, ServiceError> {
        let playlist: Option<PlaylistRecord> =
            sqlx::query_as("SELECT id, name, owner FROM playlists WHERE id = $1")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        playlist.ok_or_else(|| ServiceError::NotFound("playlist not found".to_string()))
    }

    /// Delete a playlist. The owner is recovered from the deleted row, not
    /// from caller input, so the right listing key is invalidated.
    pub async fn delete_playlist_by_id(&self, id: &str) -> Result<(), ServiceError> {
        let row: Option<(String, String)> =
            sqlx::query_as("DELETE FROM playlists WHERE id = $1 RETURNING id, owner")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        let (_, owner) = row.ok_or_else(|| {
            ServiceError::NotFound("failed to delete playlist: id not found".to_string())
        })?;

        self.cache.delete(&playlists_key(&owner)).await
    }

    pub async fn add_song_to_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<(), ServiceError> {
        let id = entity_id("song_playlist");

        let row: Option<(String,)> = sqlx::query_as(
            "INSERT INTO playlist_songs (id, playlist_id, song_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&id)
        .bind(playlist_id)
        .bind(song_id)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            return Err(ServiceError::Invariant(
                "failed to add song to playlist".to_string(),
            ));
        }

        self.cache.delete(&playlist_songs_key(playlist_id)).await
    }

    /// Access-gated composite view, read-through cached at
    /// `playlistSongs:<playlist_id>`.
    pub async fn get_playlist_songs_by_id(
        &self,
        playlist_id: &str,
        user_id: &str,
    ) -> Result<Cached<PlaylistWithSongs>, ServiceError> {
        self.verify_playlist_access(playlist_id, user_id).await?;

        let key = playlist_songs_key(playlist_id);

        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str(&raw) {
                Ok(playlist) => {
                    return Ok(Cached {
                        value: playlist,
                        from_cache: true,
                    })
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry")
                }
            }
        }

        let head: Option<(String, String, String)> = sqlx::query_as(
            "SELECT p.id, p.name, u.username FROM playlists AS p \
             INNER JOIN users AS u ON p.owner = u.id WHERE p.id = $1",
        )
        .bind(playlist_id)
        .fetch_optional(self.db.pool())
        .await?;

        let (id, name, username) =
            head.ok_or_else(|| ServiceError::NotFound("playlist not found".to_string()))?;

        let songs: Vec<SongSummary> = sqlx::query_as(
            "SELECT s.id, s.title, s.performer FROM songs AS s \
             INNER JOIN playlist_songs AS ps ON ps.song_id = s.id \
             WHERE ps.playlist_id = $1",
        )
        .bind(playlist_id)
        .fetch_all(self.db.pool())
        .await?;

        let playlist = PlaylistWithSongs {
            id,
            name,
            username,
            songs,
        };

        self.cache
            .set(&key, &serde_json::to_string(&playlist)?)
            .await;

        Ok(Cached {
            value: playlist,
            from_cache: false,
        })
    }

    pub async fn delete_song_from_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<(), ServiceError> {
        let row: Option<(String,)> = sqlx::query_as(
            "DELETE FROM playlist_songs WHERE playlist_id = $1 AND song_id = $2 RETURNING id",
        )
        .bind(playlist_id)
        .bind(song_id)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            return Err(ServiceError::Invariant(
                "failed to remove song from playlist".to_string(),
            ));
        }

        self.cache.delete(&playlist_songs_key(playlist_id)).await
    }

    /// Activity log for a playlist, read-through cached at
    /// `playlistActivities:<playlist_id>`, ordered by time ascending.
    ///
    /// Only playlist existence is checked here; whether callers beyond
    /// owner/collaborators may read activities is a route-level policy.
    pub async fn get_playlist_activities_by_id(
        &self,
        playlist_id: &str,
    ) -> Result<Cached<Vec<PlaylistActivity>>, ServiceError> {
        self.get_playlist_by_id(playlist_id).await?;

        let key = playlist_activities_key(playlist_id);

        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str(&raw) {
                Ok(activities) => {
                    return Ok(Cached {
                        value: activities,
                        from_cache: true,
                    })
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry")
                }
            }
        }

        let activities: Vec<PlaylistActivity> = sqlx::query_as(
            "SELECT u.username, s.title, a.action, a.time \
             FROM playlist_song_activities AS a \
             INNER JOIN songs AS s ON a.song_id = s.id \
             INNER JOIN users AS u ON a.user_id = u.id \
             WHERE a.playlist_id = $1 \
             ORDER BY a.time ASC",
        )
        .bind(playlist_id)
        .fetch_all(self.db.pool())
        .await?;

        self.cache
            .set(&key, &serde_json::to_string(&activities)?)
            .await;

        Ok(Cached {
            value: activities,
            from_cache: false,
        })
    }

    /// Append one activity-log entry with a server-generated timestamp.
    /// The log is append-only; entries are never mutated or deleted.
    pub async fn add_activity(
        &self,
        playlist_id: &str,
        song_id: &str,
        user_id: &str,
        action: ActivityAction,
    ) -> Result<(), ServiceError> {
        let id = entity_id("activity");
        let time = Utc::now();

        let row: Option<(String,)> = sqlx::query_as(
            "INSERT INTO playlist_song_activities (id, playlist_id, song_id, user_id, action, time) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&id)
        .bind(playlist_id)
        .bind(song_id)
        .bind(user_id)
        .bind(action.as_str())
        .bind(time)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            return Err(ServiceError::Invariant(
                "failed to record playlist activity".to_string(),
            ));
        }

        self.cache
            .delete(&playlist_activities_key(playlist_id))
            .await
    }

    /// Fails with not-found when the playlist is absent, authorization
    /// denial when it exists under a different owner.
    pub async fn verify_playlist_owner(&self, id: &str, user_id: &str) -> Result<(), ServiceError> {
        let playlist = self.get_playlist_by_id(id).await?;

        if playlist.owner != user_id {
            return Err(ServiceError::Authorization(ACCESS_DENIED.to_string()));
        }

        Ok(())
    }

    /// The authorization gate: owner first, collaborator as fallback.
    ///
    /// A not-found from the owner check propagates immediately (the
    /// playlist genuinely does not exist, so a collaborator check would be
    /// meaningless). An authorization denial triggers the collaborator
    /// fallback; if that also fails, the original denial is re-raised with
    /// its message unchanged.
    pub async fn verify_playlist_access(
        &self,
        playlist_id: &str,
        user_id: &str,
    ) -> Result<(), ServiceError> {
        let denied = match self.verify_playlist_owner(playlist_id, user_id).await {
            Ok(()) => return Ok(()),
            Err(err @ ServiceError::NotFound(_)) => return Err(err),
            Err(err) => err,
        };

        let fallback = self.collabs.verify_collaborator(playlist_id, user_id).await;
        fallback_decision(denied, fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys() {
        assert_eq!(playlists_key("user-a"), "playlists:user-a");
        assert_eq!(playlist_songs_key("playlist-a"), "playlistSongs:playlist-a");
        assert_eq!(
            playlist_activities_key("playlist-a"),
            "playlistActivities:playlist-a"
        );
    }

    #[test]
    fn test_fallback_success_grants_access() {
        let denied = ServiceError::Authorization(ACCESS_DENIED.to_string());
        assert!(fallback_decision(denied, Ok(())).is_ok());
    }

    #[test]
    fn test_fallback_failure_reraises_original_denial() {
        let denied = ServiceError::Authorization(ACCESS_DENIED.to_string());
        let fallback = Err(ServiceError::Invariant(
            "collaboration could not be verified".to_string(),
        ));

        let err = fallback_decision(denied, fallback).unwrap_err();
        match err {
            ServiceError::Authorization(message) => assert_eq!(message, ACCESS_DENIED),
            other => panic!("expected the original authorization error, got {other:?}"),
        }
    }
}
