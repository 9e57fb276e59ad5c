use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use docvault_service::ServiceError;
use docvault_types::SessionToken;

use crate::error::ServerError;
use crate::state::SharedState;

/// Credentials presented with a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(SessionToken),
    Anonymous,
}

impl Credentials {
    /// Parse `Authorization: Bearer <token>`. Anything else is anonymous.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        match token {
            Some(t) => Self::Bearer(SessionToken::new(t)),
            None => Self::Anonymous,
        }
    }

    pub fn into_token(self) -> Result<SessionToken, ServerError> {
        match self {
            Self::Bearer(token) => Ok(token),
            Self::Anonymous => Err(ServiceError::Unauthorized.into()),
        }
    }
}

/// The caller behind a valid, unexpired session token.
#[derive(Clone, Debug)]
pub struct Identity {
    pub login: String,
}

#[async_trait]
impl FromRequestParts<SharedState> for Identity {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = Credentials::from_headers(&parts.headers).into_token()?;
        let login = state.sessions.validate_token(&token).await?;
        Ok(Self { login })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        h
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(
            Credentials::from_headers(&headers("Bearer abc123")),
            Credentials::Bearer(SessionToken::new("abc123"))
        );
    }

    #[test]
    fn other_schemes_are_anonymous() {
        for auth in ["Basic dXNlcjpwdw==", "Bearer ", "abc123"] {
            assert_eq!(Credentials::from_headers(&headers(auth)), Credentials::Anonymous);
        }
        assert_eq!(Credentials::from_headers(&HeaderMap::new()), Credentials::Anonymous);
    }

    #[test]
    fn anonymous_has_no_token() {
        let err = Credentials::Anonymous.into_token().unwrap_err();
        assert_eq!(err.status().as_u16(), 401);
    }
}
