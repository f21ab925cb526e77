/// Content rules shared by the API handlers
///
/// # Modules
///
/// - [`taxonomy`]: Find-or-create for categories and tags referenced by name
/// - [`query`]: Paginated, filtered article listing and detail lookup
/// - [`articles`]: Article create, update and delete with ownership checks
///
/// Everything here is generic over the store traits, so the same code runs
/// against PostgreSQL and the in-memory store.

use crate::auth::authorization::AuthzError;
use crate::store::StoreError;

pub mod articles;
pub mod query;
pub mod taxonomy;

/// Error type for content operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// Requested resource does not exist (or is hidden from the caller)
    #[error("{0} not found")]
    NotFound(String),

    /// Input failed a business rule
    #[error("{0}")]
    Invalid(String),

    /// Write collided with an existing unique value
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    /// Invariant broken inside the service
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ContentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => {
                ContentError::Conflict(conflict_message(&constraint))
            }
            other => ContentError::Store(other),
        }
    }
}

/// Human-readable message for a unique constraint name
pub fn conflict_message(constraint: &str) -> String {
    match constraint {
        crate::store::USERS_USERNAME_KEY => "Username already exists".to_string(),
        crate::store::USERS_EMAIL_KEY => "Email already exists".to_string(),
        crate::store::ARTICLES_SLUG_KEY => "Article slug already exists".to_string(),
        crate::store::CATEGORIES_NAME_KEY => "Category name already exists".to_string(),
        crate::store::CATEGORIES_SLUG_KEY => "Category slug already exists".to_string(),
        crate::store::TAGS_NAME_KEY => "Tag name already exists".to_string(),
        crate::store::TAGS_SLUG_KEY => "Tag slug already exists".to_string(),
        _ => "Resource already exists".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_becomes_conflict() {
        let err = ContentError::from(StoreError::UniqueViolation("articles_slug_key".into()));
        assert_eq!(err, ContentError::Conflict("Article slug already exists".into()));

        let err = ContentError::from(StoreError::Database("down".into()));
        assert!(matches!(err, ContentError::Store(StoreError::Database(_))));
    }
}
