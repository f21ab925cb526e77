/// Session token codec
///
/// Issues and validates HS256-signed JWTs that bind a user identity to an
/// issue time and an expiry. The signing secret and token lifetime are given
/// to [`TokenCodec::new`] once at startup and never read from ambient state,
/// so tests can build a codec with any secret they like.
///
/// There is no revocation and no key rotation grace period: a token signed
/// with an old secret stops verifying as soon as the secret changes, and a
/// valid unexpired token is always honored.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use quillpress_shared::auth::token::TokenCodec;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("test-secret", Duration::hours(24));
/// let token = codec.issue(42, "alice")?;
///
/// let identity = codec.decode(&token)?;
/// assert_eq!(identity.user_id, 42);
/// assert_eq!(identity.username, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer claim stamped on every token
pub const ISSUER: &str = "quillpress";

/// Default token lifetime in hours
pub const DEFAULT_LIFETIME_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token is past its expiry time
    #[error("Token has expired")]
    Expired,

    /// Signature, structure or issuer did not check out
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Claims carried inside a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: i64,

    /// Username at issue time
    pub username: String,

    /// Issuer - always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Identity recovered from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: i64,
    pub username: String,
}

/// Signs and verifies session tokens with a single server-held secret
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenCodec {
    /// Creates a codec for the given secret and token lifetime
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// Lifetime applied to newly issued tokens
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issues a token for `user_id` that expires one lifetime from now
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, username, Utc::now())
    }

    /// Issues a token as if the current time were `now`
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Validates a token against the current time
    pub fn decode(&self, token: &str) -> Result<TokenIdentity, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Validates a token as if the current time were `now`
    ///
    /// A token is rejected once `now` reaches its `exp` claim. No leeway is
    /// applied.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenIdentity, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        // Expiry is checked below against the caller's clock
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(TokenIdentity {
            user_id: data.claims.sub,
            username: data.claims.username,
        })
    }
}
