use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use super::{repo_types::User, token::JwtKeys};
use crate::{error::ApiError, state::AppState};

/// Pulls the session token from the request: `Authorization` header with a
/// case-insensitive `Bearer` scheme first, `token` cookie second.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| {
            if h.len() > 7 && h[..7].eq_ignore_ascii_case("bearer ") {
                Some(h[7..].trim().to_owned())
            } else {
                None
            }
        })
        .or_else(|| {
            let jar = CookieJar::from_headers(headers);
            jar.get("token").map(|cookie| cookie.value().to_owned())
        })
}

/// Resolved caller for the current request.
///
/// One token decode plus one store lookup per request; nothing is cached
/// across requests, and the identity travels only through this value, never
/// through process-wide state.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(ApiError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "token rejected");
            ApiError::Unauthenticated
        })?;

        // the subject may have been deleted after the token was minted
        let user = User::find_by_email(&state.db, &claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    #[test]
    fn bearer_header_is_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header-token"),
        );
        headers.insert(header::COOKIE, HeaderValue::from_static("token=cookie-token"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive_and_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("bearer  spaced-token "),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("spaced-token"));
    }

    #[test]
    fn falls_back_to_token_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=x; token=cookie-token"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn non_bearer_header_falls_through_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        headers.insert(header::COOKIE, HeaderValue::from_static("token=cookie-token"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn no_header_and_no_cookie_is_none() {
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }
}
