//! Album likes service
//!
//! A user may like a given album at most once; liking an already-liked
//! album is rejected rather than toggled, so unliking always goes through
//! the explicit delete path. The like count is read-through cached at
//! `likes:<album_id>`.

use crate::core::cache::CacheService;
use crate::core::Cached;
use crate::db::DbEngine;
use crate::errors::ServiceError;
use crate::utils::ids::entity_id;

fn likes_key(album_id: &str) -> String {
    format!("likes:{album_id}")
}

#[derive(Clone)]
pub struct LikeService {
    db: DbEngine,
    cache: CacheService,
}

impl LikeService {
    pub fn new(db: DbEngine, cache: CacheService) -> Self {
        Self { db, cache }
    }

    /// Record a like. Rejects with an invariant error when the like already
    /// exists.
    pub async fn add_like(&self, user_id: &str, album_id: &str) -> Result<(), ServiceError> {
        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM user_album_likes WHERE user_id = $1 AND album_id = $2",
        )
        .bind(user_id)
        .bind(album_id)
        .fetch_optional(self.db.pool())
        .await?;

        if existing.is_some() {
            return Err(ServiceError::Invariant("album already liked".to_string()));
        }

        let id = entity_id("like");
        let row: Option<(String,)> = sqlx::query_as(
            "INSERT INTO user_album_likes (id, user_id, album_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&id)
        .bind(user_id)
        .bind(album_id)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            return Err(ServiceError::Invariant("failed to like album".to_string()));
        }

        self.cache.delete(&likes_key(album_id)).await
    }

    /// Read-through cached like count at `likes:<album_id>`. The count is
    /// cached, not the row set.
    pub async fn get_likes(&self, album_id: &str) -> Result<Cached<i64>, ServiceError> {
        let key = likes_key(album_id);

        if let Some(raw) = self.cache.get(&key).await {
            match raw.parse::<i64>() {
                Ok(count) => {
                    return Ok(Cached {
                        value: count,
                        from_cache: true,
                    })
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry")
                }
            }
        }

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_album_likes WHERE album_id = $1")
                .bind(album_id)
                .fetch_one(self.db.pool())
                .await?;

        self.cache.set(&key, &count.to_string()).await;

        Ok(Cached {
            value: count,
            from_cache: false,
        })
    }

    pub async fn delete_like(&self, user_id: &str, album_id: &str) -> Result<(), ServiceError> {
        let row: Option<(String,)> = sqlx::query_as(
            "DELETE FROM user_album_likes WHERE user_id = $1 AND album_id = $2 RETURNING id",
        )
        .bind(user_id)
        .bind(album_id)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            return Err(ServiceError::NotFound("like not found".to_string()));
        }

        self.cache.delete(&likes_key(album_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likes_key() {
        assert_eq!(likes_key("album-x"), "likes:album-x");
    }
}
