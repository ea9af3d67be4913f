//! User accounts and refresh-token store

use crate::db::DbEngine;
use crate::errors::ServiceError;
use crate::models::User;
use crate::utils::auth::{hash_password, verify_password};
use crate::utils::ids::entity_id;

#[derive(Clone)]
pub struct UserService {
    db: DbEngine,
    password_salt: String,
}

impl UserService {
    pub fn new(db: DbEngine, password_salt: String) -> Self {
        Self { db, password_salt }
    }

    /// Register a user. Usernames are unique.
    pub async fn add_user(
        &self,
        username: &str,
        password: &str,
        fullname: &str,
    ) -> Result<String, ServiceError> {
        let existing: Option<(String,)> =
            sqlx::query_as("SELECT username FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(self.db.pool())
                .await?;

        if existing.is_some() {
            return Err(ServiceError::Invariant(
                "username already taken".to_string(),
            ));
        }

        let id = entity_id("user");
        let hash = hash_password(password, &self.password_salt);

        let row: Option<(String,)> = sqlx::query_as(
            "INSERT INTO users (id, username, password, fullname) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&id)
        .bind(username)
        .bind(&hash)
        .bind(fullname)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|(id,)| id)
            .ok_or_else(|| ServiceError::Invariant("failed to add user".to_string()))
    }

    /// Check a username/password pair and return the user id. The failure
    /// message never distinguishes unknown users from wrong passwords.
    pub async fn verify_user_credential(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, ServiceError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id, password FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(self.db.pool())
                .await?;

        let (id, stored) = row.ok_or_else(|| {
            ServiceError::Authentication("invalid username or password".to_string())
        })?;

        if !verify_password(password, &self.password_salt, &stored) {
            return Err(ServiceError::Authentication(
                "invalid username or password".to_string(),
            ));
        }

        Ok(id)
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<User, ServiceError> {
        let user: Option<User> =
            sqlx::query_as("SELECT id, username, fullname FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        user.ok_or_else(|| ServiceError::NotFound("user not found".to_string()))
    }
}

/// Refresh-token store backing login sessions.
#[derive(Clone)]
pub struct AuthenticationService {
    db: DbEngine,
}

impl AuthenticationService {
    pub fn new(db: DbEngine) -> Self {
        Self { db }
    }

    pub async fn add_refresh_token(&self, token: &str) -> Result<(), ServiceError> {
        sqlx::query("INSERT INTO authentications (token) VALUES ($1)")
            .bind(token)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    pub async fn verify_refresh_token(&self, token: &str) -> Result<(), ServiceError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT token FROM authentications WHERE token = $1")
                .bind(token)
                .fetch_optional(self.db.pool())
                .await?;

        if row.is_none() {
            return Err(ServiceError::Invariant(
                "refresh token is not valid".to_string(),
            ));
        }

        Ok(())
    }

    pub async fn delete_refresh_token(&self, token: &str) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM authentications WHERE token = $1")
            .bind(token)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}
