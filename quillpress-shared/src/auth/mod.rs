/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: Signed, time-limited session tokens
/// - [`middleware`]: Bearer credential parsing and the per-request [`middleware::AuthContext`]
/// - [`authorization`]: Ownership checks for mutating content
///
/// # Example
///
/// ```no_run
/// use quillpress_shared::auth::password::{hash_password, verify_password};
/// use quillpress_shared::auth::token::TokenCodec;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let codec = TokenCodec::new("server-secret", chrono::Duration::hours(24));
/// let token = codec.issue(1, "alice")?;
/// let identity = codec.decode(&token)?;
/// assert_eq!(identity.user_id, 1);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod middleware;
pub mod password;
pub mod token;
