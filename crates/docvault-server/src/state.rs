use std::sync::Arc;

use docvault_cache::InMemoryCache;
use docvault_crypto::Argon2Hasher;
use docvault_service::{DocumentCoordinator, SessionManager};
use docvault_store::{FsBlobStore, InMemoryCredentialStore, InMemoryDocumentStore};

use crate::config::ServerConfig;

pub type Sessions = SessionManager<Arc<InMemoryCredentialStore>, Argon2Hasher>;
pub type Documents =
    DocumentCoordinator<Arc<InMemoryDocumentStore>, Arc<InMemoryCache>, FsBlobStore>;

/// Everything a request handler can reach.
pub struct AppState {
    pub config: ServerConfig,
    pub sessions: Sessions,
    pub documents: Documents,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_hasher(config, Argon2Hasher::new())
    }

    /// Wire in-memory stores, the in-process cache and blob storage under
    /// `config.storage_dir`.
    pub fn with_hasher(config: ServerConfig, hasher: Argon2Hasher) -> Self {
        let op_timeout = config.op_timeout();
        let sessions = SessionManager::new(
            Arc::new(InMemoryCredentialStore::new()),
            hasher,
            op_timeout,
        );
        let documents = DocumentCoordinator::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryCache::new()),
            FsBlobStore::new(config.storage_dir.clone()),
            config.cache_ttl(),
            op_timeout,
        );
        Self {
            config,
            sessions,
            documents,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("bind_addr", &self.config.bind_addr)
            .field("storage_dir", &self.config.storage_dir)
            .finish_non_exhaustive()
    }
}
