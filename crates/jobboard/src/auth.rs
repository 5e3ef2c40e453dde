//! Role gates for mutating operations.
//!
//! Who the caller is (tokens, sessions) is the surrounding framework's
//! problem; this module only answers whether an already-identified caller may
//! perform a mutation. Reads are open, mutations require [`Role::Admin`].

use crate::error::{ApiError, ApiResult};
use tracing::warn;

/// The caller's role, as established by the authentication layer upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct Caller {
    pub username: String,
    pub role: Role,
}

impl Caller {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self::new(username, Role::Admin)
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self::new(username, Role::User)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Require an authenticated caller.
pub fn ensure_logged_in(caller: Option<&Caller>) -> ApiResult<&Caller> {
    caller.ok_or_else(|| ApiError::unauthorized("authentication required"))
}

/// Require an authenticated caller with the admin role.
pub fn ensure_admin(caller: Option<&Caller>) -> ApiResult<&Caller> {
    let caller = ensure_logged_in(caller)?;
    if !caller.is_admin() {
        warn!(username = %caller.username, "admin-only operation denied");
        return Err(ApiError::forbidden("admin role required"));
    }
    Ok(caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_unauthorized() {
        let err = ensure_admin(None).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn non_admin_is_forbidden() {
        let caller = Caller::user("u1");
        let err = ensure_admin(Some(&caller)).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn admin_passes() {
        let caller = Caller::admin("boss");
        assert!(ensure_admin(Some(&caller)).is_ok());
    }

    #[test]
    fn logged_in_user_passes_login_gate() {
        let caller = Caller::user("u1");
        assert!(ensure_logged_in(Some(&caller)).is_ok());
    }
}
