use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

/// Application-wide error type, mapped onto fixed HTTP responses.
///
/// Client-facing messages are deliberately flat: token failures never say
/// whether the signature or the expiry was at fault, and signin never says
/// whether the email exists.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No token, bad token, or token subject no longer resolvable (401).
    #[error("Not authenticated")]
    Unauthenticated,

    /// Unknown email or wrong password, indistinguishably (401).
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Authenticated but not the resource owner (403).
    #[error("Forbidden")]
    Forbidden,

    /// Signup with an already-registered email (400).
    #[error("Email already registered")]
    DuplicateEmail,

    /// Malformed request field (400).
    #[error("{0}")]
    Validation(&'static str),

    /// Valid shape, unacceptable value (422).
    #[error("{0}")]
    Unprocessable(&'static str),

    /// Resource absent within the caller's own scope (404).
    #[error("{0}")]
    NotFound(&'static str),

    /// Anything else: store failures and the like (500).
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::DuplicateEmail | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Internal(e) = &self {
            // full detail stays in the logs, never in the body
            error!(error = %e, "internal error");
        }

        let mut response =
            (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response();

        if matches!(self, ApiError::Unauthenticated) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}
