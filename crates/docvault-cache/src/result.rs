use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use docvault_types::Document;

use crate::backend::CacheBackend;
use crate::error::{CacheError, CacheResult};

/// Namespace prefix shared by every listing key.
pub const KEY_PREFIX: &str = "docs";

/// Composite key `docs:{viewer}:{filter_key}:{filter_value}:{limit}`.
///
/// Components are escaped (see [`escape_component`]) so distinct inputs never
/// share a key. Identical inputs always produce identical keys.
pub fn listing_key(viewer: &str, filter_key: &str, filter_value: &str, limit: i64) -> String {
    format!(
        "{KEY_PREFIX}:{}:{}:{}:{limit}",
        escape_component(viewer),
        escape_component(filter_key),
        escape_component(filter_value),
    )
}

/// Pattern covering every key built with `viewer == owner`.
pub fn owner_pattern(owner: &str) -> String {
    format!("{KEY_PREFIX}:{}:*", escape_component(owner))
}

/// Percent-encode every byte outside `[A-Za-z0-9._-]`.
///
/// The output never contains the `:` separator or a glob metacharacter.
pub fn escape_component(raw: &str) -> Cow<'_, str> {
    let plain = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-');
    if raw.bytes().all(plain) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() * 3);
    for b in raw.bytes() {
        if plain(b) {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    Cow::Owned(out)
}

/// Memoized document listings over a [`CacheBackend`].
///
/// Every backend call is bounded by `op_timeout` and every failure is
/// absorbed here: the caller sees a miss, or nothing at all.
pub struct ResultCache<C> {
    backend: C,
    op_timeout: Duration,
}

impl<C: CacheBackend> ResultCache<C> {
    pub fn new(backend: C, op_timeout: Duration) -> Self {
        Self {
            backend,
            op_timeout,
        }
    }

    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Cached listing for `key`, or `None` on miss, expiry, malformed entry
    /// or backend failure.
    pub async fn get(&self, key: &str) -> Option<Vec<Document>> {
        let raw = match self.bounded("get", self.backend.get(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, falling back to store");
                return None;
            }
        };
        match serde_json::from_slice::<Vec<Document>>(&raw) {
            Ok(docs) => {
                tracing::debug!(key, count = docs.len(), "cache hit");
                Some(docs)
            }
            Err(e) => {
                tracing::debug!(key, error = %e, "malformed cache entry treated as miss");
                None
            }
        }
    }

    /// Store `docs` under `key` for `ttl`. Failures are logged and dropped.
    pub async fn put(&self, key: &str, docs: &[Document], ttl: Duration) {
        let raw = match serde_json::to_vec(docs) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "could not serialize listing for cache");
                return;
            }
        };
        if let Err(e) = self.bounded("set", self.backend.set(key, raw, ttl)).await {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }

    /// Drop every listing cached for viewer `owner`. Failures are logged and
    /// dropped.
    pub async fn invalidate_owner(&self, owner: &str) {
        let pattern = owner_pattern(owner);
        let keys = match self
            .bounded("keys", self.backend.keys_matching(&pattern))
            .await
        {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(owner, error = %e, "cache invalidation lookup failed");
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        match self.bounded("delete", self.backend.delete_many(&keys)).await {
            Ok(removed) => tracing::debug!(owner, removed, "cache invalidated"),
            Err(e) => tracing::warn!(owner, error = %e, "cache invalidation failed"),
        }
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = CacheResult<T>>,
    ) -> CacheResult<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                op,
                elapsed: self.op_timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCache;
    use async_trait::async_trait;
    use chrono::Utc;
    use docvault_types::{DocumentId, DocumentMeta};
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(1);
    const TTL: Duration = Duration::from_secs(60);

    fn doc(owner: &str, name: &str) -> Document {
        let meta = DocumentMeta {
            name: name.into(),
            ..Default::default()
        };
        Document::from_meta(DocumentId::generate(), owner, meta, None, Utc::now())
    }

    /// Backend that fails every call.
    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
        async fn keys_matching(&self, _pattern: &str) -> CacheResult<Vec<String>> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
        async fn delete_many(&self, _keys: &[String]) -> CacheResult<usize> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
    }

    /// Backend whose calls never complete.
    struct HangingBackend;

    #[async_trait]
    impl CacheBackend for HangingBackend {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            std::future::pending().await
        }
        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> CacheResult<()> {
            std::future::pending().await
        }
        async fn keys_matching(&self, _pattern: &str) -> CacheResult<Vec<String>> {
            std::future::pending().await
        }
        async fn delete_many(&self, _keys: &[String]) -> CacheResult<usize> {
            std::future::pending().await
        }
    }

    #[test]
    fn key_layout() {
        assert_eq!(
            listing_key("alice1234", "name", "a.txt", 10),
            "docs:alice1234:name:a.txt:10"
        );
        assert_eq!(listing_key("alice1234", "", "", 0), "docs:alice1234:::0");
        assert_eq!(owner_pattern("alice1234"), "docs:alice1234:*");
    }

    #[test]
    fn separators_in_components_do_not_collide() {
        assert_ne!(
            listing_key("alice1234", "name:a", "b", 0),
            listing_key("alice1234", "name", "a:b", 0)
        );
        assert_eq!(
            listing_key("alice1234", "name", "a:b", 0),
            "docs:alice1234:name:a%3Ab:0"
        );
        assert_eq!(escape_component("50%*[x]?"), "50%25%2A%5Bx%5D%3F");
        assert_eq!(owner_pattern("a:*"), "docs:a%3A%2A:*");
    }

    proptest::proptest! {
        #[test]
        fn key_is_deterministic(
            viewer in "[A-Za-z0-9]{8,16}",
            k in "[a-z]{0,6}",
            v in "[a-z0-9]{0,6}",
            limit in proptest::num::i64::ANY,
        ) {
            let a = listing_key(&viewer, &k, &v, limit);
            let b = listing_key(&viewer, &k, &v, limit);
            proptest::prop_assert_eq!(&a, &b);
            let prefix = format!("docs:{viewer}:");
            proptest::prop_assert!(a.starts_with(&prefix));
        }

        #[test]
        fn distinct_filters_give_distinct_keys(
            k1 in ".{0,6}", v1 in ".{0,6}", k2 in ".{0,6}", v2 in ".{0,6}",
        ) {
            proptest::prop_assume!((&k1, &v1) != (&k2, &v2));
            proptest::prop_assert_ne!(
                listing_key("alice1234", &k1, &v1, 0),
                listing_key("alice1234", &k2, &v2, 0)
            );
        }

        #[test]
        fn owner_pattern_covers_owner_keys(
            owner in ".{1,10}", k in ".{0,6}", v in ".{0,6}", limit in 0i64..100,
        ) {
            let matcher = globset::Glob::new(&owner_pattern(&owner))
                .unwrap()
                .compile_matcher();
            let key = listing_key(&owner, &k, &v, limit);
            proptest::prop_assert!(matcher.is_match(key.as_str()));
        }
    }

    #[tokio::test]
    async fn put_then_get() {
        let cache = ResultCache::new(InMemoryCache::new(), TIMEOUT);
        let docs = vec![doc("alice1234", "a"), doc("alice1234", "b")];
        let key = listing_key("alice1234", "", "", 0);
        cache.put(&key, &docs, TTL).await;
        assert_eq!(cache.get(&key).await, Some(docs));
    }

    #[tokio::test]
    async fn empty_listing_is_cached() {
        let cache = ResultCache::new(InMemoryCache::new(), TIMEOUT);
        cache.put("docs:x:::0", &[], TTL).await;
        assert_eq!(cache.get("docs:x:::0").await, Some(vec![]));
    }

    #[tokio::test]
    async fn malformed_entry_is_a_miss() {
        let backend = Arc::new(InMemoryCache::new());
        backend.set("docs:x:::0", b"{not json".to_vec(), TTL).await.unwrap();
        let cache = ResultCache::new(Arc::clone(&backend), TIMEOUT);
        assert_eq!(cache.get("docs:x:::0").await, None);
    }

    #[tokio::test]
    async fn invalidate_owner_only_touches_owner_namespace() {
        let cache = ResultCache::new(InMemoryCache::new(), TIMEOUT);
        let alice = vec![doc("alice1234", "a")];
        cache.put("docs:alice1234:::0", &alice, TTL).await;
        cache.put("docs:alice1234:name:a:1", &alice, TTL).await;
        cache.put("docs:bob123456:::0", &alice, TTL).await;

        cache.invalidate_owner("alice1234").await;

        assert_eq!(cache.get("docs:alice1234:::0").await, None);
        assert_eq!(cache.get("docs:alice1234:name:a:1").await, None);
        assert_eq!(cache.get("docs:bob123456:::0").await, Some(alice));
    }

    #[tokio::test]
    async fn broken_backend_is_absorbed() {
        let cache = ResultCache::new(BrokenBackend, TIMEOUT);
        cache.put("docs:x:::0", &[doc("x", "a")], TTL).await;
        assert_eq!(cache.get("docs:x:::0").await, None);
        cache.invalidate_owner("x").await;
    }

    #[tokio::test]
    async fn hanging_backend_is_bounded() {
        let cache = ResultCache::new(HangingBackend, Duration::from_millis(20));
        assert_eq!(cache.get("docs:x:::0").await, None);
        cache.put("docs:x:::0", &[], TTL).await;
        cache.invalidate_owner("x").await;
    }
}
