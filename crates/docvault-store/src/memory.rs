use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use docvault_types::{Document, DocumentId, Session, SessionToken, Timestamp, User, UserId};

use crate::error::{StoreError, StoreResult};
use crate::query::DocumentQuery;
use crate::traits::{CredentialStore, DocumentStore, SessionRecord};

#[derive(Default)]
struct UserTable {
    by_login: HashMap<String, User>,
    login_by_id: HashMap<UserId, String>,
}

/// In-memory, HashMap-based credential store.
///
/// Intended for tests and single-process deployments. Users and sessions
/// live behind separate `RwLock`s; records are cloned on read.
pub struct InMemoryCredentialStore {
    users: RwLock<UserTable>,
    sessions: RwLock<HashMap<SessionToken, Session>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(UserTable::default()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.users.read().expect("lock poisoned").by_login.len()
    }

    /// Number of session rows, expired ones included.
    pub fn session_count(&self) -> usize {
        self.sessions.read().expect("lock poisoned").len()
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().expect("lock poisoned");
        if users.by_login.contains_key(&user.login) {
            return Err(StoreError::Conflict {
                entity: "user",
                key: user.login.clone(),
            });
        }
        users.login_by_id.insert(user.id, user.login.clone());
        users.by_login.insert(user.login.clone(), user.clone());
        Ok(())
    }

    async fn get_user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().expect("lock poisoned");
        Ok(users.by_login.get(login).cloned())
    }

    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        let mut sessions = self.sessions.write().expect("lock poisoned");
        if sessions.contains_key(&session.token) {
            return Err(StoreError::Conflict {
                entity: "session",
                key: "<token>".into(),
            });
        }
        sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn get_session_by_token(
        &self,
        token: &SessionToken,
    ) -> StoreResult<Option<SessionRecord>> {
        let session = match self.sessions.read().expect("lock poisoned").get(token) {
            Some(s) => s.clone(),
            None => return Ok(None),
        };
        let users = self.users.read().expect("lock poisoned");
        // Inner join: a session whose user is gone resolves to nothing.
        Ok(users
            .login_by_id
            .get(&session.user_id)
            .map(|login| SessionRecord {
                login: login.clone(),
                session,
            }))
    }

    async fn delete_session(&self, token: &SessionToken) -> StoreResult<bool> {
        let mut sessions = self.sessions.write().expect("lock poisoned");
        Ok(sessions.remove(token).is_some())
    }

    async fn get_active_session_for_user(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> StoreResult<Option<Session>> {
        let sessions = self.sessions.read().expect("lock poisoned");
        Ok(sessions
            .values()
            .filter(|s| s.user_id == *user_id && s.expires_at > now)
            .max_by_key(|s| s.expires_at)
            .cloned())
    }
}

impl std::fmt::Debug for InMemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCredentialStore")
            .field("user_count", &self.user_count())
            .field("session_count", &self.session_count())
            .finish()
    }
}

/// In-memory, HashMap-based document store.
///
/// Listing is a full scan filtered by the query's visibility predicate and
/// attribute filter, then sorted and truncated.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_document(&self, doc: &Document) -> StoreResult<()> {
        let mut documents = self.documents.write().expect("lock poisoned");
        if documents.contains_key(&doc.id) {
            return Err(StoreError::Conflict {
                entity: "document",
                key: doc.id.to_string(),
            });
        }
        documents.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn get_document(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        let documents = self.documents.read().expect("lock poisoned");
        Ok(documents.get(id).cloned())
    }

    async fn delete_document(&self, id: &DocumentId) -> StoreResult<bool> {
        let mut documents = self.documents.write().expect("lock poisoned");
        Ok(documents.remove(id).is_some())
    }

    async fn list_documents(&self, query: &DocumentQuery) -> StoreResult<Vec<Document>> {
        let rows: Vec<Document> = {
            let documents = self.documents.read().expect("lock poisoned");
            documents
                .values()
                .filter(|d| query.matches(d))
                .cloned()
                .collect()
        };
        Ok(query.finish(rows))
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &self.len())
            .finish()
    }
}
