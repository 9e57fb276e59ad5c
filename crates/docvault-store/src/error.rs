/// Errors from record and blob store operations.
///
/// Absence of a record is not an error; see the `Option`/`bool` returns on
/// the store traits.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("{entity} already exists: {key}")]
    Conflict { entity: &'static str, key: String },

    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A blob name that cannot be mapped to a storage location.
    #[error("invalid blob name: {0:?}")]
    InvalidBlobName(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
