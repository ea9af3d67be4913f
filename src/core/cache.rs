//! Key/value cache accessor with expiry
//!
//! Read-through callers treat `None` from `get` as a MISS and fall through
//! to the relational store. Correctness comes from invalidation, not from
//! atomicity of population: concurrent get+set races are acceptable, but
//! `delete` must complete before a write is acknowledged, so it is the only
//! operation whose failure propagates to the caller.
//!
//! Two backends: `Redis` for real deployments and `Local` (an in-process
//! map) for development and tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use redis::AsyncCommands;

use crate::errors::ServiceError;

/// Default entry lifetime: 30 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

#[derive(Clone)]
struct LocalEntry {
    value: String,
    expires_at: Instant,
}

#[derive(Clone)]
enum CacheBackend {
    Local(Arc<DashMap<String, LocalEntry>>),
    Redis(deadpool_redis::Pool),
}

/// Cache accessor shared by all services.
#[derive(Clone)]
pub struct CacheService {
    backend: CacheBackend,
    ttl: Duration,
}

impl CacheService {
    /// In-process cache with per-entry expiry.
    pub fn new_local() -> Self {
        Self {
            backend: CacheBackend::Local(Arc::new(DashMap::new())),
            ttl: DEFAULT_TTL,
        }
    }

    /// Redis-backed cache.
    pub fn new_redis(pool: deadpool_redis::Pool) -> Self {
        Self {
            backend: CacheBackend::Redis(pool),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Look up a key. `None` is a MISS; store errors degrade to a MISS so a
    /// cache outage never fails a read.
    pub async fn get(&self, key: &str) -> Option<String> {
        match &self.backend {
            CacheBackend::Local(map) => {
                if let Some(entry) = map.get(key) {
                    if entry.expires_at > Instant::now() {
                        return Some(entry.value.clone());
                    }
                    drop(entry);
                    map.remove(key);
                }
                None
            }
            CacheBackend::Redis(pool) => {
                let mut conn = match pool.get().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to get redis connection");
                        return None;
                    }
                };

                match conn.get::<_, Option<String>>(key).await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "redis GET error");
                        None
                    }
                }
            }
        }
    }

    /// Populate a key with the service TTL. Failures are logged and
    /// swallowed: a lost population only costs a future miss.
    pub async fn set(&self, key: &str, value: &str) {
        match &self.backend {
            CacheBackend::Local(map) => {
                map.insert(
                    key.to_string(),
                    LocalEntry {
                        value: value.to_string(),
                        expires_at: Instant::now() + self.ttl,
                    },
                );
            }
            CacheBackend::Redis(pool) => {
                let mut conn = match pool.get().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to get redis connection");
                        return;
                    }
                };

                if let Err(e) = conn
                    .set_ex::<_, _, ()>(key, value, self.ttl.as_secs())
                    .await
                {
                    tracing::warn!(key = %key, error = %e, "redis SET error");
                }
            }
        }
    }

    /// Invalidate a key. This runs synchronously on every write path and a
    /// failure propagates: acknowledging a write without invalidating would
    /// let the cache serve stale post-write data.
    pub async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        match &self.backend {
            CacheBackend::Local(map) => {
                map.remove(key);
                Ok(())
            }
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await.map_err(|e| {
                    ServiceError::Internal(anyhow::anyhow!("failed to get redis connection: {e}"))
                })?;

                conn.del::<_, ()>(key)
                    .await
                    .map_err(|e| ServiceError::Internal(anyhow::anyhow!("redis DEL error: {e}")))?;

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_misses_on_absent_key() {
        let cache = CacheService::new_local();
        assert_eq!(cache.get("album:nope").await, None);
    }

    #[tokio::test]
    async fn test_set_then_get_hits() {
        let cache = CacheService::new_local();
        cache.set("album:a", "{\"id\":\"album-a\"}").await;

        assert_eq!(
            cache.get("album:a").await.as_deref(),
            Some("{\"id\":\"album-a\"}")
        );
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = CacheService::new_local();
        cache.set("likes:a", "1").await;
        cache.set("likes:a", "2").await;

        assert_eq!(cache.get("likes:a").await.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_delete_invalidates() {
        let cache = CacheService::new_local();
        cache.set("album:a", "cached").await;
        cache.delete("album:a").await.unwrap();

        assert_eq!(cache.get("album:a").await, None);
    }

    #[tokio::test]
    async fn test_delete_of_absent_key_is_ok() {
        let cache = CacheService::new_local();
        assert!(cache.delete("album:nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = CacheService::new_local().with_ttl(Duration::from_millis(10));
        cache.set("album:a", "cached").await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("album:a").await, None);
    }
}
