use docvault_crypto::CryptoError;
use docvault_store::StoreError;

/// Why a piece of client input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("login must be at least 8 ASCII letters or digits")]
    InvalidLogin,

    #[error(
        "password must be at least 8 characters and contain upper case, lower case, \
         a digit and a non-alphanumeric symbol"
    )]
    WeakPassword,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("malformed input: {0}")]
    Malformed(String),
}

/// Errors surfaced by the docvault core.
///
/// Cache failures never appear here; they are absorbed by the result cache.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(#[from] InputError),

    #[error("invalid login or password")]
    InvalidCredentials,

    #[error("missing, unknown or expired session token")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    /// Store unreachable, timed out, or otherwise failing. Detail is for
    /// logs, not clients.
    #[error("transient failure: {0}")]
    Transient(String),
}

impl ServiceError {
    /// Stable machine-readable name for this error class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidCredentials | Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Transient(_) => "transient",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { entity, .. } => Self::Conflict(format!("{entity} already exists")),
            other => Self::Transient(other.to_string()),
        }
    }
}

impl From<CryptoError> for ServiceError {
    fn from(e: CryptoError) -> Self {
        Self::Transient(e.to_string())
    }
}

/// Result alias for core operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
