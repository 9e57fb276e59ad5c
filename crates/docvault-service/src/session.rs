use std::time::Duration;

use chrono::Utc;
use docvault_crypto::{generate_token, PasswordHasher};
use docvault_store::CredentialStore;
use docvault_types::{Session, SessionToken, User};

use crate::error::{InputError, ServiceError, ServiceResult};
use crate::timeout::bounded;
use crate::validate::CredentialValidator;

/// Issues, validates, reuses and revokes session tokens.
///
/// At most one unexpired session per user is handed out: a repeat
/// [`authenticate`](Self::authenticate) within the TTL returns the existing
/// token. Password hashing runs on the blocking pool.
pub struct SessionManager<S, H> {
    store: S,
    hasher: H,
    validator: CredentialValidator,
    /// Verified against when the login is unknown, so both failure paths
    /// cost one hash check.
    decoy_digest: Option<String>,
    op_timeout: Duration,
}

const DECOY_PASSWORD: &str = "docvault-decoy-password";

impl<S, H> SessionManager<S, H>
where
    S: CredentialStore,
    H: PasswordHasher + Clone + 'static,
{
    pub fn new(store: S, hasher: H, op_timeout: Duration) -> Self {
        let decoy_digest = match hasher.digest(DECOY_PASSWORD) {
            Ok(digest) => Some(digest),
            Err(e) => {
                tracing::warn!(error = %e, "could not prepare decoy digest");
                None
            }
        };
        Self {
            store,
            hasher,
            validator: CredentialValidator::new(),
            decoy_digest,
            op_timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Exchange a login and password for a session token valid for `ttl`.
    ///
    /// Unknown login and wrong password fail identically with
    /// [`ServiceError::InvalidCredentials`].
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
        ttl: Duration,
    ) -> ServiceResult<SessionToken> {
        let user = bounded(
            self.op_timeout,
            "get user",
            self.store.get_user_by_login(login),
        )
        .await?;
        let Some(user) = user else {
            if let Some(decoy) = &self.decoy_digest {
                self.verify(decoy, password).await?;
            }
            tracing::debug!(login, "authentication failed");
            return Err(ServiceError::InvalidCredentials);
        };
        if !self.verify(&user.password_digest, password).await? {
            tracing::debug!(login, "authentication failed");
            return Err(ServiceError::InvalidCredentials);
        }

        let now = Utc::now();
        let active = bounded(
            self.op_timeout,
            "get active session",
            self.store.get_active_session_for_user(&user.id, now),
        )
        .await?;
        if let Some(session) = active {
            tracing::debug!(login, "reusing active session");
            return Ok(session.token);
        }

        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| InputError::Malformed(format!("session ttl out of range: {ttl:?}")))?;
        let session = Session {
            token: generate_token(),
            user_id: user.id,
            expires_at,
        };
        bounded(
            self.op_timeout,
            "insert session",
            self.store.insert_session(&session),
        )
        .await?;
        tracing::info!(login, expires_at = %session.expires_at, "session issued");
        Ok(session.token)
    }

    /// Resolve a bearer token to the owning login.
    ///
    /// An expired session is deleted before [`ServiceError::Unauthorized`]
    /// is returned.
    pub async fn validate_token(&self, token: &SessionToken) -> ServiceResult<String> {
        if token.as_str().is_empty() {
            return Err(ServiceError::Unauthorized);
        }
        let record = bounded(
            self.op_timeout,
            "get session",
            self.store.get_session_by_token(token),
        )
        .await?
        .ok_or(ServiceError::Unauthorized)?;

        if record.session.is_expired_at(Utc::now()) {
            match bounded(
                self.op_timeout,
                "delete session",
                self.store.delete_session(token),
            )
            .await
            {
                Ok(_) => tracing::debug!(login = %record.login, "expired session removed"),
                Err(e) => tracing::warn!(error = %e, "could not remove expired session"),
            }
            return Err(ServiceError::Unauthorized);
        }
        Ok(record.login)
    }

    /// Revoke a session. [`ServiceError::NotFound`] if the token is unknown.
    pub async fn logout(&self, token: &SessionToken) -> ServiceResult<()> {
        let deleted = bounded(
            self.op_timeout,
            "delete session",
            self.store.delete_session(token),
        )
        .await?;
        if !deleted {
            return Err(ServiceError::NotFound("session"));
        }
        tracing::info!("session revoked");
        Ok(())
    }

    /// Create a user, gated by the deployment's admin token.
    ///
    /// An empty `expected_admin_token` disables registration entirely.
    pub async fn register(
        &self,
        admin_token: &str,
        login: &str,
        password: &str,
        expected_admin_token: &str,
    ) -> ServiceResult<()> {
        if expected_admin_token.is_empty() || admin_token != expected_admin_token {
            tracing::warn!(login, "registration refused: bad admin token");
            return Err(ServiceError::Forbidden);
        }
        self.validator.validate_login(login)?;
        self.validator.validate_password(password)?;

        let digest = self.digest(password).await?;
        let user = User::new(login, digest);
        bounded(self.op_timeout, "insert user", self.store.insert_user(&user)).await?;
        tracing::info!(login, user_id = %user.id, "user registered");
        Ok(())
    }

    async fn verify(&self, digest: &str, password: &str) -> ServiceResult<bool> {
        let hasher = self.hasher.clone();
        let digest = digest.to_string();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&digest, &password))
            .await
            .map_err(|e| ServiceError::Transient(format!("password check aborted: {e}")))
    }

    async fn digest(&self, password: &str) -> ServiceResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let digest = tokio::task::spawn_blocking(move || hasher.digest(&password))
            .await
            .map_err(|e| ServiceError::Transient(format!("password hashing aborted: {e}")))??;
        Ok(digest)
    }
}

impl<S, H> std::fmt::Debug for SessionManager<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("op_timeout", &self.op_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_crypto::Argon2Hasher;
    use docvault_crypto::CryptoResult;
    use docvault_store::InMemoryCredentialStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Argon2 hasher that counts `verify` calls.
    #[derive(Clone)]
    struct CountingHasher {
        inner: Argon2Hasher,
        verifies: Arc<AtomicUsize>,
    }

    impl PasswordHasher for CountingHasher {
        fn digest(&self, plaintext: &str) -> CryptoResult<String> {
            self.inner.digest(plaintext)
        }

        fn verify(&self, digest: &str, plaintext: &str) -> bool {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(digest, plaintext)
        }
    }

    const ADMIN: &str = "admin-secret";
    const TIMEOUT: Duration = Duration::from_secs(5);
    const HOUR: Duration = Duration::from_secs(3600);

    fn manager() -> SessionManager<Arc<InMemoryCredentialStore>, Argon2Hasher> {
        let hasher = Argon2Hasher::with_params(8, 1, 1).unwrap();
        SessionManager::new(Arc::new(InMemoryCredentialStore::new()), hasher, TIMEOUT)
    }

    fn input_error(err: ServiceError) -> InputError {
        match err {
            ServiceError::InvalidInput(e) => e,
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn registration_scenario() {
        let m = manager();
        m.register(ADMIN, "alice1234", "Str0ng!Pw", ADMIN).await.unwrap();

        let err = m.register("wrong", "bob123456", "Str0ng!Pw", ADMIN).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));

        let err = m.register(ADMIN, "short", "Str0ng!Pw", ADMIN).await.unwrap_err();
        assert_eq!(input_error(err), InputError::InvalidLogin);

        let err = m.register(ADMIN, "bob123456", "weak", ADMIN).await.unwrap_err();
        assert_eq!(input_error(err), InputError::WeakPassword);

        let err = m.register(ADMIN, "alice1234", "Str0ng!Pw", ADMIN).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(m.store().user_count(), 1);
    }

    #[tokio::test]
    async fn empty_admin_token_disables_registration() {
        let m = manager();
        let err = m.register("", "alice1234", "Str0ng!Pw", "").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[tokio::test]
    async fn forbidden_is_checked_before_input() {
        let m = manager();
        let err = m.register("wrong", "x", "y", ADMIN).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[tokio::test]
    async fn authenticate_reuses_active_token() {
        let m = manager();
        m.register(ADMIN, "alice1234", "Str0ng!Pw", ADMIN).await.unwrap();

        let first = m.authenticate("alice1234", "Str0ng!Pw", HOUR).await.unwrap();
        let second = m.authenticate("alice1234", "Str0ng!Pw", HOUR).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(m.store().session_count(), 1);
        assert_eq!(m.validate_token(&first).await.unwrap(), "alice1234");
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable() {
        let m = manager();
        m.register(ADMIN, "alice1234", "Str0ng!Pw", ADMIN).await.unwrap();

        let wrong_pw = m.authenticate("alice1234", "Wr0ng!Pw", HOUR).await.unwrap_err();
        let no_user = m.authenticate("nobody123", "Str0ng!Pw", HOUR).await.unwrap_err();
        assert!(matches!(wrong_pw, ServiceError::InvalidCredentials));
        assert!(matches!(no_user, ServiceError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), no_user.to_string());
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_removed() {
        let m = manager();
        m.register(ADMIN, "alice1234", "Str0ng!Pw", ADMIN).await.unwrap();
        let token = m
            .authenticate("alice1234", "Str0ng!Pw", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        let err = m.validate_token(&token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        assert_eq!(m.store().session_count(), 0);
        let err = m.validate_token(&token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));

        let fresh = m.authenticate("alice1234", "Str0ng!Pw", HOUR).await.unwrap();
        assert_ne!(fresh, token);
    }

    #[tokio::test]
    async fn unknown_and_empty_tokens_are_unauthorized() {
        let m = manager();
        for token in ["", "deadbeef"] {
            let err = m.validate_token(&SessionToken::new(token)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Unauthorized));
        }
    }

    #[tokio::test]
    async fn logout_revokes() {
        let m = manager();
        m.register(ADMIN, "alice1234", "Str0ng!Pw", ADMIN).await.unwrap();
        let token = m.authenticate("alice1234", "Str0ng!Pw", HOUR).await.unwrap();

        m.logout(&token).await.unwrap();
        assert!(matches!(
            m.validate_token(&token).await.unwrap_err(),
            ServiceError::Unauthorized
        ));
        assert!(matches!(
            m.logout(&token).await.unwrap_err(),
            ServiceError::NotFound("session")
        ));
    }

    #[tokio::test]
    async fn unrepresentable_ttl_is_invalid_input() {
        let m = manager();
        m.register(ADMIN, "alice1234", "Str0ng!Pw", ADMIN).await.unwrap();
        for ttl in [Duration::from_secs(10_000_000_000_000), Duration::MAX] {
            let err = m.authenticate("alice1234", "Str0ng!Pw", ttl).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(InputError::Malformed(_))));
        }
        assert_eq!(m.store().session_count(), 0);
        m.authenticate("alice1234", "Str0ng!Pw", HOUR).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_login_still_checks_a_password() {
        let verifies = Arc::new(AtomicUsize::new(0));
        let hasher = CountingHasher {
            inner: Argon2Hasher::with_params(8, 1, 1).unwrap(),
            verifies: Arc::clone(&verifies),
        };
        let m = SessionManager::new(Arc::new(InMemoryCredentialStore::new()), hasher, TIMEOUT);

        let err = m.authenticate("nobody123", "Str0ng!Pw", HOUR).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
        assert_eq!(verifies.load(Ordering::SeqCst), 1);
    }
}
