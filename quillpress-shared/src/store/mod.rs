/// Storage seam for users, taxonomy and articles
///
/// Business logic in [`crate::content`] and the API handlers talk to storage
/// only through the traits in this module. Two backends implement them:
///
/// - [`postgres::PgStore`]: PostgreSQL through the model SQL in [`crate::models`]
/// - [`memory::MemoryStore`]: process-local tables behind a lock, enforcing the
///   same unique and foreign-key rules as the schema
///
/// The API server holds the store as `Arc<dyn ContentStore>`.
///
/// # Errors
///
/// Row absence is reported as `Ok(None)` (or `false` for deletes). Writes that
/// collide with a unique constraint fail with [`StoreError::UniqueViolation`]
/// carrying the constraint name, so callers can tell a duplicate slug from a
/// duplicate name.

use async_trait::async_trait;

use crate::models::article::{Article, ArticleChanges, ArticleFilter, ArticleSummary, NewArticle};
use crate::models::category::{Category, NewCategory};
use crate::models::tag::{NewTag, Tag};
use crate::models::user::{NewUser, User};

pub mod memory;
pub mod postgres;

pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const ARTICLES_SLUG_KEY: &str = "articles_slug_key";
pub const CATEGORIES_NAME_KEY: &str = "categories_name_key";
pub const CATEGORIES_SLUG_KEY: &str = "categories_slug_key";
pub const TAGS_NAME_KEY: &str = "tags_name_key";
pub const TAGS_SLUG_KEY: &str = "tags_slug_key";

/// Error type for storage operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A row that had to exist did not
    #[error("Row not found")]
    NotFound,

    /// Write rejected by the named unique constraint
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Write referenced a row that doesn't exist
    #[error("Foreign key violated: {0}")]
    ForeignKeyViolation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) => {
                let constraint = db.constraint().unwrap_or_default().to_string();
                if db.is_unique_violation() {
                    StoreError::UniqueViolation(constraint)
                } else if db.is_foreign_key_violation() {
                    StoreError::ForeignKeyViolation(constraint)
                } else {
                    StoreError::Database(db.to_string())
                }
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// User accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, data: NewUser) -> StoreResult<User>;
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Lookup by username, falling back to email
    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<User>>;

    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool>;
    async fn count_users(&self) -> StoreResult<i64>;
}

/// Categories and tags
#[async_trait]
pub trait TaxonomyStore: Send + Sync {
    async fn create_category(&self, data: NewCategory) -> StoreResult<Category>;
    async fn find_category_by_id(&self, id: i64) -> StoreResult<Option<Category>>;
    async fn find_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>>;

    /// Exact, case-sensitive match on name or slug
    async fn find_category_by_name_or_slug(&self, key: &str) -> StoreResult<Option<Category>>;

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn update_category(&self, id: i64, data: NewCategory) -> StoreResult<Option<Category>>;
    async fn delete_category(&self, id: i64) -> StoreResult<bool>;

    async fn create_tag(&self, data: NewTag) -> StoreResult<Tag>;
    async fn find_tag_by_slug(&self, slug: &str) -> StoreResult<Option<Tag>>;

    /// Exact, case-sensitive match on name or slug
    async fn find_tag_by_name_or_slug(&self, key: &str) -> StoreResult<Option<Tag>>;

    async fn list_tags(&self) -> StoreResult<Vec<Tag>>;
    async fn update_tag(&self, id: i64, data: NewTag) -> StoreResult<Option<Tag>>;
    async fn delete_tag(&self, id: i64) -> StoreResult<bool>;
}

/// Articles and their tag associations
///
/// Soft-deleted articles are invisible to every method here.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn create_article(&self, data: NewArticle) -> StoreResult<Article>;
    async fn find_article_by_slug(
        &self,
        slug: &str,
        published_only: bool,
    ) -> StoreResult<Option<Article>>;
    async fn update_article(&self, id: i64, changes: ArticleChanges)
        -> StoreResult<Option<Article>>;
    async fn soft_delete_article(&self, id: i64) -> StoreResult<bool>;

    /// Replaces the whole tag set of an article; an empty slice clears it
    async fn replace_article_tags(&self, id: i64, tag_ids: &[i64]) -> StoreResult<()>;

    /// Tags of an article ordered by name
    async fn article_tags(&self, id: i64) -> StoreResult<Vec<Tag>>;

    /// Page of summaries ordered by `created_at` descending, then `id`
    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ArticleSummary>>;
    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64>;
}

/// Everything the API needs from storage
pub trait ContentStore: UserStore + TaxonomyStore + ArticleStore {}

impl<T> ContentStore for T where T: UserStore + TaxonomyStore + ArticleStore + ?Sized {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(StoreError::from(sqlx::Error::RowNotFound), StoreError::NotFound);
    }
}
