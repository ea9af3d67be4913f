//! Song catalog service
//!
//! Listings are read-through cached per filter pair at
//! `songs:<title>-<performer>`: distinct filter pairs never collide but
//! never share an entry either, even when their results overlap. The cached
//! value is the unshaped row set; response shaping (caps, combined filter)
//! happens at the HTTP layer.

use crate::core::cache::CacheService;
use crate::core::Cached;
use crate::db::DbEngine;
use crate::errors::ServiceError;
use crate::models::{Song, SongSummary};
use crate::utils::ids::entity_id;

fn songs_key(title: &str, performer: &str) -> String {
    format!("songs:{title}-{performer}")
}

/// Fields accepted by song create/update.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SongPayload {
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(rename = "albumId", default)]
    pub album_id: Option<String>,
}

#[derive(Clone)]
pub struct SongService {
    db: DbEngine,
    cache: CacheService,
}

impl SongService {
    pub fn new(db: DbEngine, cache: CacheService) -> Self {
        Self { db, cache }
    }

    /// Insert a song and return its generated id.
    pub async fn add_song(&self, payload: &SongPayload) -> Result<String, ServiceError> {
        let id = entity_id("song");

        let row: Option<(String,)> = sqlx::query_as(
            "INSERT INTO songs (id, title, year, genre, performer, duration, album_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&id)
        .bind(&payload.title)
        .bind(payload.year)
        .bind(&payload.genre)
        .bind(&payload.performer)
        .bind(payload.duration)
        .bind(&payload.album_id)
        .fetch_optional(self.db.pool())
        .await?;

        let id = row
            .map(|(id,)| id)
            .ok_or_else(|| ServiceError::Invariant("failed to add song".to_string()))?;

        self.cache
            .delete(&songs_key(&payload.title, &payload.performer))
            .await?;

        Ok(id)
    }

    /// Read-through listing at `songs:<title>-<performer>`. The store query
    /// is a coarse OR prefilter; the AND semantics and result caps are
    /// applied by the handler after retrieval.
    pub async fn get_songs(
        &self,
        title: &str,
        performer: &str,
    ) -> Result<Cached<Vec<SongSummary>>, ServiceError> {
        let key = songs_key(title, performer);

        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str(&raw) {
                Ok(songs) => {
                    return Ok(Cached {
                        value: songs,
                        from_cache: true,
                    })
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry")
                }
            }
        }

        let songs: Vec<SongSummary> = sqlx::query_as(
            "SELECT id, title, performer FROM songs WHERE title ILIKE $1 OR performer ILIKE $2",
        )
        .bind(format!("%{title}%"))
        .bind(format!("%{performer}%"))
        .fetch_all(self.db.pool())
        .await?;

        self.cache.set(&key, &serde_json::to_string(&songs)?).await;

        Ok(Cached {
            value: songs,
            from_cache: false,
        })
    }

    /// Uncached single-song lookup.
    pub async fn get_song_by_id(&self, id: &str) -> Result<Song, ServiceError> {
        let song: Option<Song> = sqlx::query_as(
            "SELECT id, title, year, genre, performer, duration, album_id FROM songs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        song.ok_or_else(|| ServiceError::NotFound("song not found".to_string()))
    }

    /// Uncached; used by album detail assembly, always a live store query.
    pub async fn get_songs_by_album_id(&self, album_id: &str) -> Result<Vec<Song>, ServiceError> {
        let songs: Vec<Song> = sqlx::query_as(
            "SELECT id, title, year, genre, performer, duration, album_id FROM songs \
             WHERE album_id = $1",
        )
        .bind(album_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(songs)
    }

    /// Update a song. Both the pre-edit and post-edit listing keys are
    /// invalidated so no list can serve the stale pre-edit row.
    pub async fn edit_song_by_id(
        &self,
        id: &str,
        payload: &SongPayload,
    ) -> Result<(), ServiceError> {
        let old = self.get_song_by_id(id).await?;

        let row: Option<(String,)> = sqlx::query_as(
            "UPDATE songs SET title = $1, year = $2, genre = $3, performer = $4, \
             duration = $5, album_id = $6 WHERE id = $7 RETURNING id",
        )
        .bind(&payload.title)
        .bind(payload.year)
        .bind(&payload.genre)
        .bind(&payload.performer)
        .bind(payload.duration)
        .bind(&payload.album_id)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            return Err(ServiceError::NotFound(
                "failed to update song: id not found".to_string(),
            ));
        }

        let old_key = songs_key(&old.title, &old.performer);
        let new_key = songs_key(&payload.title, &payload.performer);
        self.cache.delete(&old_key).await?;
        if new_key != old_key {
            self.cache.delete(&new_key).await?;
        }

        Ok(())
    }

    pub async fn delete_song_by_id(&self, id: &str) -> Result<(), ServiceError> {
        let song = self.get_song_by_id(id).await?;

        let row: Option<(String,)> = sqlx::query_as("DELETE FROM songs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        if row.is_none() {
            return Err(ServiceError::NotFound(
                "failed to delete song: id not found".to_string(),
            ));
        }

        self.cache
            .delete(&songs_key(&song.title, &song.performer))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_songs_key_combines_both_filters() {
        assert_eq!(songs_key("Clocks", "Coldplay"), "songs:Clocks-Coldplay");
        assert_eq!(songs_key("", ""), "songs:-");
    }
}
