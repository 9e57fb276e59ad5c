use std::time::Duration;

use thiserror::Error;

/// Errors from cache backend operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached or refused the operation.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// The key pattern could not be compiled.
    #[error("invalid key pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The operation did not finish within the configured bound.
    #[error("cache {op} timed out after {elapsed:?}")]
    Timeout { op: &'static str, elapsed: Duration },
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
