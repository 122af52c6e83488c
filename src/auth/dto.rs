use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::User;

/// Request body for signup and signin.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response returned after signup or signin.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str, // always "bearer"
    pub user: PublicUser,
}

/// Session half of the introspection response. The session id is the raw
/// token itself; nothing is stored server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user_id: Uuid,
}

/// User half of the introspection response (camelCase on the wire).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// GET /auth/session body: both halves null when no valid session exists.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Option<SessionInfo>,
    pub user: Option<SessionUser>,
}

impl SessionResponse {
    pub fn empty() -> Self {
        Self {
            session: None,
            user: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn auth_response_serialization() {
        let response = AuthResponse {
            access_token: "tok".to_string(),
            token_type: "bearer",
            user: PublicUser::from(sample_user()),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""token_type":"bearer""#));
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn session_response_uses_camel_case() {
        let user = sample_user();
        let response = SessionResponse {
            session: Some(SessionInfo {
                id: "tok".to_string(),
                expires_at: OffsetDateTime::now_utc(),
                user_id: user.id,
            }),
            user: Some(SessionUser::from(&user)),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""expiresAt""#));
        assert!(json.contains(r#""userId""#));
        assert!(json.contains(r#""createdAt""#));
    }

    #[test]
    fn empty_session_response_is_all_null() {
        let json = serde_json::to_string(&SessionResponse::empty()).unwrap();
        assert_eq!(json, r#"{"session":null,"user":null}"#);
    }
}
