use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{CryptoError, CryptoResult};

/// Opaque password digest capability.
///
/// Implementations are expensive by design; callers should keep them off hot
/// paths and off the async executor.
pub trait PasswordHasher: Send + Sync {
    /// Produce an opaque digest of `plaintext`.
    fn digest(&self, plaintext: &str) -> CryptoResult<String>;

    /// Check `plaintext` against a digest produced by [`Self::digest`].
    ///
    /// A malformed digest verifies as `false`.
    fn verify(&self, digest: &str, plaintext: &str) -> bool;
}

/// Argon2id digests in PHC string format.
#[derive(Clone, Debug)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Hasher using the library's recommended Argon2id parameters.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with explicit cost parameters (memory in KiB, iterations,
    /// parallelism).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> CryptoResult<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn digest(&self, plaintext: &str) -> CryptoResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CryptoError::Hashing(e.to_string()))
    }

    fn verify(&self, digest: &str, plaintext: &str) -> bool {
        // Parameters are read back from the PHC string, so digests made with
        // other cost settings still verify.
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
