use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;

/// Key/value cache backend with per-entry TTL and glob key matching.
///
/// Modelled on the subset of a Redis client the result cache needs. Callers
/// treat every method as best-effort.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read a value. `Ok(None)` if absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Write a value, replacing any existing one. A zero `ttl` means the
    /// entry never expires.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// All live keys matching a glob pattern (`*`, `?`, `[...]`).
    async fn keys_matching(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Delete the given keys. Returns how many existed.
    async fn delete_many(&self, keys: &[String]) -> CacheResult<usize>;
}

#[async_trait]
impl<T: CacheBackend + ?Sized> CacheBackend for Arc<T> {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        (**self).set(key, value, ttl).await
    }

    async fn keys_matching(&self, pattern: &str) -> CacheResult<Vec<String>> {
        (**self).keys_matching(pattern).await
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<usize> {
        (**self).delete_many(keys).await
    }
}
