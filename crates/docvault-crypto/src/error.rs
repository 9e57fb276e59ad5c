use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The password primitive failed to produce a digest.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
