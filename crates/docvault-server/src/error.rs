use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docvault_service::ServiceError;
use thiserror::Error;

use crate::response::Envelope;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(e) => match e {
                ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ServiceError::InvalidCredentials | ServiceError::Unauthorized => {
                    StatusCode::UNAUTHORIZED
                }
                ServiceError::Forbidden => StatusCode::FORBIDDEN,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine code and client-facing text. Server-side detail stays in logs.
    fn public(&self) -> (&'static str, String) {
        match self {
            Self::Service(ServiceError::Transient(_)) => {
                ("transient", "service temporarily unavailable".into())
            }
            Self::Service(e) => (e.code(), e.to_string()),
            Self::BadRequest(m) => ("invalid_input", m.clone()),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                ("internal", "internal server error".into())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let (code, text) = self.public();
        (status, Envelope::error(code, text)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_service::InputError;

    #[test]
    fn service_errors_map_to_status() {
        let cases = [
            (ServiceError::InvalidInput(InputError::WeakPassword), 400),
            (ServiceError::InvalidCredentials, 401),
            (ServiceError::Unauthorized, 401),
            (ServiceError::Forbidden, 403),
            (ServiceError::NotFound("document"), 404),
            (ServiceError::Conflict("user already exists".into()), 409),
            (ServiceError::Transient("db down".into()), 503),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status().as_u16(), status);
        }
    }

    #[test]
    fn transient_detail_is_not_exposed() {
        let err = ServerError::from(ServiceError::Transient("10.0.0.5 refused".into()));
        let (code, text) = err.public();
        assert_eq!(code, "transient");
        assert!(!text.contains("10.0.0.5"));
    }
}
