use uuid::Uuid;

use super::repo_types::User;
use crate::error::ApiError;

/// Ownership check applied at every entry point that names an owner.
///
/// Must run before any resource lookup so a caller cannot learn whether
/// resources exist under someone else's account.
pub fn ensure_user_scope(caller: &User, owner_id: Uuid) -> Result<(), ApiError> {
    if caller.id != owner_id {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn user_with_id(id: Uuid) -> User {
        User {
            id,
            email: "a@x.com".to_string(),
            password_hash: String::new(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn allows_the_owner() {
        let id = Uuid::new_v4();
        assert!(ensure_user_scope(&user_with_id(id), id).is_ok());
    }

    #[test]
    fn forbids_any_other_owner() {
        let caller = user_with_id(Uuid::new_v4());
        let err = ensure_user_scope(&caller, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }
}
