/// Database models for Quillpress
///
/// Each model owns the SQL for its table and exposes it as associated
/// functions taking a `&PgPool`. The [`crate::store`] module wraps these
/// behind a trait so business logic can run against either PostgreSQL or the
/// in-memory store.
///
/// # Models
///
/// - `user`: Accounts and password hashes
/// - `category`: Article categories
/// - `tag`: Article tags
/// - `article`: Articles, their tag associations and the listing query
///
/// # Example
///
/// ```no_run
/// use quillpress_shared::models::user::{NewUser, User};
/// use quillpress_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     NewUser {
///         username: "alice".to_string(),
///         email: "alice@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod article;
pub mod category;
pub mod tag;
pub mod user;
