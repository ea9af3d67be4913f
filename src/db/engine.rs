//! Database engine and connection management
//!
//! The engine wraps the PostgreSQL pool and is cloned into every service
//! at construction; there is no process-global handle.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Database engine wrapper
#[derive(Clone)]
pub struct DbEngine {
    pool: PgPool,
}

impl DbEngine {
    /// Connect to PostgreSQL
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create all database tables
    pub async fn create_tables(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(50) PRIMARY KEY,
                username VARCHAR(50) UNIQUE NOT NULL,
                password TEXT NOT NULL,
                fullname TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS authentications (
                token TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS albums (
                id VARCHAR(50) PRIMARY KEY,
                name TEXT NOT NULL,
                year INT NOT NULL,
                cover TEXT
            )
            "#,
            // album_id is deliberately unconstrained: deleting an album does
            // not cascade to its songs
            r#"
            CREATE TABLE IF NOT EXISTS songs (
                id VARCHAR(50) PRIMARY KEY,
                title TEXT NOT NULL,
                year INT NOT NULL,
                genre TEXT NOT NULL,
                performer TEXT NOT NULL,
                duration INT,
                album_id VARCHAR(50)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS playlists (
                id VARCHAR(50) PRIMARY KEY,
                name TEXT NOT NULL,
                owner VARCHAR(50) REFERENCES users(id) ON DELETE CASCADE
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS playlist_songs (
                id VARCHAR(50) PRIMARY KEY,
                playlist_id VARCHAR(50) NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
                song_id VARCHAR(50) NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
                UNIQUE(playlist_id, song_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS collaborations (
                id VARCHAR(50) PRIMARY KEY,
                playlist_id VARCHAR(50) NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
                user_id VARCHAR(50) NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                UNIQUE(playlist_id, user_id)
            )
            "#,
            // song_id and user_id are unconstrained so the append-only log
            // survives entity deletion; reads inner-join songs/users, so rows
            // referencing deleted entities simply drop out of the view
            r#"
            CREATE TABLE IF NOT EXISTS playlist_song_activities (
                id VARCHAR(50) PRIMARY KEY,
                playlist_id VARCHAR(50) NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
                song_id VARCHAR(50) NOT NULL,
                user_id VARCHAR(50) NOT NULL,
                action TEXT NOT NULL,
                time TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS user_album_likes (
                id VARCHAR(50) PRIMARY KEY,
                user_id VARCHAR(50) NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                album_id VARCHAR(50) NOT NULL REFERENCES albums(id) ON DELETE CASCADE,
                UNIQUE(user_id, album_id)
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_songs_album_id ON songs(album_id)",
            "CREATE INDEX IF NOT EXISTS idx_playlist_songs_playlist_id ON playlist_songs(playlist_id)",
            "CREATE INDEX IF NOT EXISTS idx_collaborations_user_id ON collaborations(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_activities_playlist_id ON playlist_song_activities(playlist_id)",
            "CREATE INDEX IF NOT EXISTS idx_likes_album_id ON user_album_likes(album_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to create tables")?;
        }

        Ok(())
    }
}
