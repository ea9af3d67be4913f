//! Local-disk storage for uploaded cover images
//!
//! Stored files get a millisecond-timestamp prefix so repeated uploads of
//! the same filename never collide, and names are stripped of anything
//! that could escape the upload directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::errors::ServiceError;

#[derive(Clone)]
pub struct StorageService {
    base_dir: PathBuf,
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

impl StorageService {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create upload directory {}", base_dir.display()))?;

        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write uploaded bytes and return the stored filename.
    pub async fn write_file(&self, filename: &str, data: &[u8]) -> Result<String, ServiceError> {
        let stored = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_filename(filename)
        );

        tokio::fs::write(self.base_dir.join(&stored), data)
            .await
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("failed to store upload: {e}")))?;

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cover.png"), "cover.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("héllo cover.png"), "h_llo_cover.png");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("///"), "file");
    }

    #[tokio::test]
    async fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path()).unwrap();

        let stored = storage.write_file("cover.png", b"png bytes").await.unwrap();
        assert!(stored.ends_with("-cover.png"));

        let content = tokio::fs::read(dir.path().join(&stored)).await.unwrap();
        assert_eq!(content, b"png bytes");
    }
}
