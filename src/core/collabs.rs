//! Playlist collaboration authority
//!
//! Grants non-owner users read/write access to a playlist. Adding or
//! removing a collaborator changes that user's playlist listing, so both
//! writes invalidate `playlists:<user_id>` for the collaborator.

use crate::core::cache::CacheService;
use crate::core::playlists::playlists_key;
use crate::db::DbEngine;
use crate::errors::ServiceError;
use crate::utils::ids::entity_id;

#[derive(Clone)]
pub struct CollaborationService {
    db: DbEngine,
    cache: CacheService,
}

impl CollaborationService {
    pub fn new(db: DbEngine, cache: CacheService) -> Self {
        Self { db, cache }
    }

    pub async fn add_collaboration(
        &self,
        playlist_id: &str,
        user_id: &str,
    ) -> Result<String, ServiceError> {
        let id = entity_id("collab");

        let row: Option<(String,)> = sqlx::query_as(
            "INSERT INTO collaborations (id, playlist_id, user_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&id)
        .bind(playlist_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        let id = row
            .map(|(id,)| id)
            .ok_or_else(|| ServiceError::Invariant("failed to add collaboration".to_string()))?;

        self.cache.delete(&playlists_key(user_id)).await?;

        Ok(id)
    }

    pub async fn delete_collaboration(
        &self,
        playlist_id: &str,
        user_id: &str,
    ) -> Result<(), ServiceError> {
        let row: Option<(String,)> = sqlx::query_as(
            "DELETE FROM collaborations WHERE playlist_id = $1 AND user_id = $2 RETURNING id",
        )
        .bind(playlist_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            return Err(ServiceError::Invariant(
                "failed to delete collaboration".to_string(),
            ));
        }

        self.cache.delete(&playlists_key(user_id)).await
    }

    /// Check whether the user is a registered collaborator on the playlist.
    pub async fn verify_collaborator(
        &self,
        playlist_id: &str,
        user_id: &str,
    ) -> Result<(), ServiceError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM collaborations WHERE playlist_id = $1 AND user_id = $2",
        )
        .bind(playlist_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            return Err(ServiceError::Invariant(
                "collaboration could not be verified".to_string(),
            ));
        }

        Ok(())
    }
}
