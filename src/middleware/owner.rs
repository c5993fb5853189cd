use crate::error::ApiError;
use crate::middleware::auth::AuthIdentity;

/// The single ownership check: a declared owner (path, query or body
/// parameter) must equal the verified caller email exactly. A mismatch is
/// rejected before any store operation runs.
pub fn require_owner(identity: &AuthIdentity, declared_owner: &str) -> Result<(), ApiError> {
    if identity.email == declared_owner {
        Ok(())
    } else {
        Err(ApiError::forbidden("forbidden access"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: &str) -> AuthIdentity {
        AuthIdentity { email: email.to_string(), role: None }
    }

    #[test]
    fn matching_owner_is_allowed() {
        assert!(require_owner(&identity("a@b.c"), "a@b.c").is_ok());
    }

    #[test]
    fn different_owner_is_forbidden() {
        let err = require_owner(&identity("a@b.c"), "other@b.c").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        assert!(require_owner(&identity("a@b.c"), "A@b.c").is_err());
    }
}
