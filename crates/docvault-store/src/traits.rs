//! Record store contracts consumed by the docvault core.

use std::sync::Arc;

use async_trait::async_trait;
use docvault_types::{Document, DocumentId, Session, SessionToken, Timestamp, User, UserId};

use crate::error::StoreResult;
use crate::query::DocumentQuery;

/// A session joined to the login of the user that owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub session: Session,
    pub login: String,
}

/// Durable user and session records.
///
/// Implementations must be safe for concurrent use; the core holds no locks
/// of its own around store calls.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new user. Fails with `Conflict` if the login is taken.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Look a user up by login. `Ok(None)` if no such user.
    async fn get_user_by_login(&self, login: &str) -> StoreResult<Option<User>>;

    /// Persist a new session. Fails with `Conflict` on a duplicate token.
    async fn insert_session(&self, session: &Session) -> StoreResult<()>;

    /// Resolve a token to its session and the owning user's login.
    ///
    /// Expired sessions are returned as-is; expiry is the caller's decision.
    async fn get_session_by_token(&self, token: &SessionToken)
        -> StoreResult<Option<SessionRecord>>;

    /// Delete a session. Returns `true` if it existed.
    async fn delete_session(&self, token: &SessionToken) -> StoreResult<bool>;

    /// The user's unexpired session with the latest `expires_at`, if any.
    async fn get_active_session_for_user(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> StoreResult<Option<Session>>;
}

/// Durable document records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document. Fails with `Conflict` on a duplicate id.
    async fn insert_document(&self, doc: &Document) -> StoreResult<()>;

    /// Raw lookup by id, no visibility check. `Ok(None)` if absent.
    async fn get_document(&self, id: &DocumentId) -> StoreResult<Option<Document>>;

    /// Delete a document. Returns `true` if a row was removed.
    async fn delete_document(&self, id: &DocumentId) -> StoreResult<bool>;

    /// All documents matching `query`, ordered and limited as it specifies.
    async fn list_documents(&self, query: &DocumentQuery) -> StoreResult<Vec<Document>>;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        (**self).insert_user(user).await
    }

    async fn get_user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        (**self).get_user_by_login(login).await
    }

    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        (**self).insert_session(session).await
    }

    async fn get_session_by_token(
        &self,
        token: &SessionToken,
    ) -> StoreResult<Option<SessionRecord>> {
        (**self).get_session_by_token(token).await
    }

    async fn delete_session(&self, token: &SessionToken) -> StoreResult<bool> {
        (**self).delete_session(token).await
    }

    async fn get_active_session_for_user(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> StoreResult<Option<Session>> {
        (**self).get_active_session_for_user(user_id, now).await
    }
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn insert_document(&self, doc: &Document) -> StoreResult<()> {
        (**self).insert_document(doc).await
    }

    async fn get_document(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        (**self).get_document(id).await
    }

    async fn delete_document(&self, id: &DocumentId) -> StoreResult<bool> {
        (**self).delete_document(id).await
    }

    async fn list_documents(&self, query: &DocumentQuery) -> StoreResult<Vec<Document>> {
        (**self).list_documents(query).await
    }
}
