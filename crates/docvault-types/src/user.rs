use serde::{Deserialize, Serialize};

use crate::ids::{SessionToken, UserId};
use crate::Timestamp;

/// A registered account.
///
/// Users are immutable once created. The password digest is opaque to
/// everything except the password primitive that produced it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub password_digest: String,
    pub created_at: Timestamp,
}

impl User {
    /// Build a new user with a fresh id, created now.
    pub fn new(login: impl Into<String>, password_digest: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            login: login.into(),
            password_digest: password_digest.into(),
            created_at: chrono::Utc::now(),
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// A bearer session bound to a user until `expires_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub expires_at: Timestamp,
}

impl Session {
    /// A session is expired once `now` is strictly past `expires_at`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}
