use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use globset::Glob;

use crate::backend::CacheBackend;
use crate::error::{CacheError, CacheResult};

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Every this many writes, `set` sweeps all expired entries.
pub const SWEEP_EVERY: usize = 64;

/// In-process cache backend.
///
/// Entries sit in a `HashMap` behind a `RwLock`. Expired entries are evicted
/// by the first `get` that observes them, and in bulk every
/// [`SWEEP_EVERY`] writes; `keys_matching` skips them.
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    writes: AtomicUsize,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().expect("lock poisoned");
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().expect("lock poisoned");
            match entries.get(key) {
                None => return Ok(None),
                Some(e) if e.is_live(now) => return Ok(Some(e.value.clone())),
                Some(_) => {}
            }
        }
        // Expired: evict under the write lock, re-checking in case a
        // concurrent `set` refreshed it.
        let mut entries = self.entries.write().expect("lock poisoned");
        match entries.get(key) {
            Some(e) if e.is_live(now) => Ok(Some(e.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        // A TTL too large to represent never expires.
        let expires_at = if ttl.is_zero() {
            None
        } else {
            now.checked_add(ttl)
        };
        let sweep = (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0;
        let mut entries = self.entries.write().expect("lock poisoned");
        if sweep {
            let before = entries.len();
            entries.retain(|_, e| e.is_live(now));
            let removed = before - entries.len();
            if removed > 0 {
                tracing::debug!(removed, "swept expired cache entries");
            }
        }
        entries.insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn keys_matching(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let matcher = Glob::new(pattern)
            .map_err(|e| CacheError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?
            .compile_matcher();
        let now = Instant::now();
        let entries = self.entries.read().expect("lock poisoned");
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(k, e)| e.is_live(now) && matcher.is_match(k.as_str()))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<usize> {
        let mut entries = self.entries.write().expect("lock poisoned");
        Ok(keys.iter().filter(|k| entries.remove(k.as_str()).is_some()).count())
    }
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("entry_count", &self.len())
            .finish()
    }
}
