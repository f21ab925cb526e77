/// Password hashing using Argon2id
///
/// Every hash gets a fresh random salt and the same fixed cost, so verifying a
/// login takes a few tens of milliseconds on ordinary hardware. Hashes are
/// stored in PHC string format, which embeds the parameters and the salt.
///
/// # Example
///
/// ```
/// use quillpress_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("password1")?;
/// assert!(verify_password("password1", &hash)?);
/// assert!(!verify_password("password2", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Memory cost in KiB (19 MiB)
pub const MEMORY_COST_KIB: u32 = 19_456;

/// Number of passes over memory
pub const TIME_COST: u32 = 2;

/// Degree of parallelism
pub const PARALLELISM: u32 = 1;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Stored hash could not be parsed or checked
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(MEMORY_COST_KIB)
        .t_cost(TIME_COST)
        .p_cost(PARALLELISM)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the salt cannot be generated or the
/// hash computation fails. Callers must treat this as fatal for the operation.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a plaintext password against a stored hash
///
/// The digest comparison is constant-time. Returns `Ok(false)` for a wrong
/// password and an error only when the stored hash itself is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    if parsed.salt.is_none() || parsed.hash.is_none() {
        return Err(PasswordError::InvalidHash(
            "Stored hash has no salt or digest".to_string(),
        ));
    }

    match hasher()?.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::InvalidHash(format!("Verification failed: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("password1").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains(&format!("m={}", MEMORY_COST_KIB)));
        assert!(hash.contains(&format!("t={}", TIME_COST)));
        assert!(hash.contains(&format!("p={}", PARALLELISM)));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    #[test]
    fn test_verify_matches_only_original_password() {
        let passwords = ["password1", "with spaces", "unicode-密码", ""];

        for p in passwords {
            let hash = hash_password(p).unwrap();
            assert!(verify_password(p, &hash).unwrap(), "'{}' should verify", p);

            for q in passwords.iter().filter(|q| **q != p) {
                assert!(
                    !verify_password(q, &hash).unwrap(),
                    "'{}' must not verify against hash of '{}'",
                    q,
                    p
                );
            }
        }
    }

    #[test]
    fn test_verify_invalid_hash_is_error() {
        assert!(verify_password("password", "not-a-hash").is_err());
        assert!(verify_password("password", "$argon2id$broken").is_err());
    }

    #[test]
    fn test_truncated_hash_is_not_a_wrong_password() {
        let hash = hash_password("password1").unwrap();
        let params_only = hash.rsplitn(3, '$').last().unwrap();

        let result = verify_password("password1", params_only);
        assert!(matches!(result, Err(PasswordError::InvalidHash(_))));
    }
}
