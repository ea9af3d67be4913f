//! Album catalog service
//!
//! Single-item reads are read-through cached at `album:<id>`; every write
//! invalidates that key before it is acknowledged.

use crate::core::cache::CacheService;
use crate::core::Cached;
use crate::db::DbEngine;
use crate::errors::ServiceError;
use crate::models::Album;
use crate::utils::ids::entity_id;

fn album_key(id: &str) -> String {
    format!("album:{id}")
}

#[derive(Clone)]
pub struct AlbumService {
    db: DbEngine,
    cache: CacheService,
}

impl AlbumService {
    pub fn new(db: DbEngine, cache: CacheService) -> Self {
        Self { db, cache }
    }

    /// Insert an album and return its generated id.
    pub async fn add_album(&self, name: &str, year: i32) -> Result<String, ServiceError> {
        let id = entity_id("album");

        let row: Option<(String,)> =
            sqlx::query_as("INSERT INTO albums (id, name, year) VALUES ($1, $2, $3) RETURNING id")
                .bind(&id)
                .bind(name)
                .bind(year)
                .fetch_optional(self.db.pool())
                .await?;

        let id = row
            .map(|(id,)| id)
            .ok_or_else(|| ServiceError::Invariant("failed to add album".to_string()))?;

        // nothing is cached under a fresh id yet; the write path invalidates
        // unconditionally anyway
        self.cache.delete(&album_key(&id)).await?;

        Ok(id)
    }

    /// Read-through lookup at `album:<id>`.
    pub async fn get_album_by_id(&self, id: &str) -> Result<Cached<Album>, ServiceError> {
        let key = album_key(id);

        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str(&raw) {
                Ok(album) => {
                    return Ok(Cached {
                        value: album,
                        from_cache: true,
                    })
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry")
                }
            }
        }

        let album: Option<Album> =
            sqlx::query_as("SELECT id, name, year, cover FROM albums WHERE id = $1")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        let album = album.ok_or_else(|| ServiceError::NotFound("album not found".to_string()))?;

        self.cache.set(&key, &serde_json::to_string(&album)?).await;

        Ok(Cached {
            value: album,
            from_cache: false,
        })
    }

    pub async fn edit_album_by_id(
        &self,
        id: &str,
        name: &str,
        year: i32,
    ) -> Result<(), ServiceError> {
        let row: Option<(String,)> =
            sqlx::query_as("UPDATE albums SET name = $1, year = $2 WHERE id = $3 RETURNING id")
                .bind(name)
                .bind(year)
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        if row.is_none() {
            return Err(ServiceError::NotFound(
                "failed to update album: id not found".to_string(),
            ));
        }

        self.cache.delete(&album_key(id)).await
    }

    pub async fn delete_album_by_id(&self, id: &str) -> Result<(), ServiceError> {
        let row: Option<(String,)> =
            sqlx::query_as("DELETE FROM albums WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        if row.is_none() {
            return Err(ServiceError::NotFound(
                "failed to delete album: id not found".to_string(),
            ));
        }

        self.cache.delete(&album_key(id)).await
    }

    /// Set the cover URL only; other columns are untouched.
    pub async fn add_cover_url(&self, id: &str, url: &str) -> Result<(), ServiceError> {
        let row: Option<(String,)> =
            sqlx::query_as("UPDATE albums SET cover = $1 WHERE id = $2 RETURNING id")
                .bind(url)
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        if row.is_none() {
            return Err(ServiceError::NotFound(
                "failed to set album cover: id not found".to_string(),
            ));
        }

        self.cache.delete(&album_key(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_key() {
        assert_eq!(album_key("album-x"), "album:album-x");
    }
}
