use axum::{
    extract::{FromRef, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, CredentialsRequest, PublicUser, SessionInfo, SessionResponse, SessionUser},
    extractors::{token_from_headers, CurrentUser},
    password::{hash_password, verify_password},
    repo_types::User,
    token::JwtKeys,
};
use crate::{error::ApiError, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/session", get(session))
        .route("/auth/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn session_cookie(token: &str, ttl: std::time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(("token", token.to_owned()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::seconds(ttl.as_secs() as i64))
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(("token", String::new()))
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}

/// Shared tail of signup and signin: mint the token, set the cookie, and
/// echo the token in the body for non-cookie clients.
fn issue_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign(&user.email)?;
    let jar = jar.add(session_cookie(
        &access_token,
        keys.ttl,
        state.config.cookie_secure,
    ));
    Ok((
        jar,
        Json(AuthResponse {
            access_token,
            token_type: "bearer",
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    if !is_valid_email(&payload.email) {
        warn!("signup with invalid email");
        return Err(ApiError::Validation("Invalid email"));
    }

    // uniqueness is an exact match on the stored value
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    issue_session(&state, jar, user)
}

#[instrument(skip(state, jar, payload))]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    // unknown email and wrong password produce the same response
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!("signin with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "signin with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user signed in");
    issue_session(&state, jar, user)
}

/// Clears the client-side cookie only. An already-issued bearer token stays
/// valid until its natural expiry; there is no server-side revocation.
#[instrument(skip(jar))]
pub async fn signout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    (
        jar.add(clear_session_cookie()),
        Json(serde_json::json!({ "success": true })),
    )
}

/// Session introspection. Never 401s: an absent or invalid token yields a
/// body with both halves null.
#[instrument(skip(state, headers))]
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let Some(token) = token_from_headers(&headers) else {
        return Ok(Json(SessionResponse::empty()));
    };

    let keys = JwtKeys::from_ref(&state);
    let Ok(claims) = keys.verify(&token) else {
        return Ok(Json(SessionResponse::empty()));
    };

    let Some(user) = User::find_by_email(&state.db, &claims.sub).await? else {
        return Ok(Json(SessionResponse::empty()));
    };

    let expires_at =
        OffsetDateTime::from_unix_timestamp(claims.exp as i64).map_err(anyhow::Error::from)?;

    Ok(Json(SessionResponse {
        user: Some(SessionUser::from(&user)),
        session: Some(SessionInfo {
            id: token,
            expires_at,
            user_id: user.id,
        }),
    }))
}

#[instrument(skip(user))]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@x"));
    }

    #[test]
    fn email_is_not_normalized() {
        // uppercase forms are distinct, valid addresses
        assert!(is_valid_email("A@X.com"));
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok", std::time::Duration::from_secs(1800), false);
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(TimeDuration::seconds(1800)));
    }

    #[test]
    fn clear_cookie_is_a_removal() {
        let cookie = clear_session_cookie();
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.max_age(), Some(TimeDuration::ZERO));
    }
}
