/// Ownership checks for content mutation
///
/// Articles record their author; only that author may change or delete them.
/// A resource without a recorded owner (legacy or orphaned rows) can be
/// changed by any authenticated caller. Categories and tags have no owner at
/// all, so the only requirement for mutating them is being signed in.
///
/// # Example
///
/// ```
/// use quillpress_shared::auth::authorization::{require_owner, AuthzError};
/// use quillpress_shared::auth::middleware::AuthContext;
///
/// let alice = AuthContext::authenticated(1);
/// assert!(require_owner(&alice, Some(1)).is_ok());
/// assert!(require_owner(&alice, None).is_ok());
/// assert!(matches!(require_owner(&alice, Some(2)), Err(AuthzError::Forbidden)));
/// ```

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller has no identity
    #[error("Authentication required")]
    Unauthenticated,

    /// Caller is not the recorded owner
    #[error("Not authorized to modify this resource")]
    Forbidden,
}

/// Returns the caller's user ID, or fails if the request is anonymous
pub fn require_authenticated(auth: &AuthContext) -> Result<i64, AuthzError> {
    match auth.user_id {
        Some(id) if auth.is_authenticated => Ok(id),
        _ => Err(AuthzError::Unauthenticated),
    }
}

/// Checks that the caller may mutate a resource owned by `owner_id`
pub fn require_owner(auth: &AuthContext, owner_id: Option<i64>) -> Result<(), AuthzError> {
    let caller = require_authenticated(auth)?;

    match owner_id {
        Some(owner) if owner != caller => Err(AuthzError::Forbidden),
        _ => Ok(()),
    }
}
