/// Request authentication
///
/// Parses the `Authorization: Bearer <token>` header, validates the token with
/// a [`TokenCodec`] and produces a typed [`AuthContext`]. The API server runs
/// this from its middleware layers and stores the context in request
/// extensions, where handlers pick it up with `Extension<AuthContext>`.
///
/// Two modes exist:
///
/// - [`authenticate`]: a credential is required
/// - [`authenticate_optional`]: a missing header yields an anonymous context,
///   but a credential that is present and bad is still rejected
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use chrono::Duration;
/// use quillpress_shared::auth::middleware::{authenticate, authenticate_optional};
/// use quillpress_shared::auth::token::TokenCodec;
///
/// let codec = TokenCodec::new("secret", Duration::hours(1));
/// let token = codec.issue(3, "alice").unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::AUTHORIZATION,
///     HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
/// );
///
/// let ctx = authenticate(&headers, &codec).unwrap();
/// assert_eq!(ctx.user_id, Some(3));
///
/// let anonymous = authenticate_optional(&HeaderMap::new(), &codec).unwrap();
/// assert!(!anonymous.is_authenticated);
/// ```

use axum::http::{header, HeaderMap};

use super::token::{TokenCodec, TokenError};

/// Identity attached to every request that passed the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Authenticated user ID (None for anonymous readers)
    pub user_id: Option<i64>,

    /// Whether a valid credential was presented
    pub is_authenticated: bool,
}

impl AuthContext {
    /// Context for a caller that presented a valid token
    pub fn authenticated(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            is_authenticated: true,
        }
    }

    /// Context for a caller with no credential
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            is_authenticated: false,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    Unauthenticated,

    /// Header is not `Bearer <token>`
    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    /// Token failed validation
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Splits an Authorization header value into its bearer token
pub fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| AuthError::MalformedCredential("Expected '<scheme> <token>'".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedCredential(format!(
            "Unsupported scheme '{}'",
            scheme
        )));
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MalformedCredential(
            "Expected a single bearer token".to_string(),
        ));
    }

    Ok(token)
}

/// Authenticates a request that must carry a credential
pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> Result<AuthContext, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Unauthenticated)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential("Header is not valid ASCII".to_string()))?;

    let token = parse_bearer(value)?;
    let identity = codec.decode(token)?;

    Ok(AuthContext::authenticated(identity.user_id))
}

/// Authenticates a request where the credential is optional
pub fn authenticate_optional(
    headers: &HeaderMap,
    codec: &TokenCodec,
) -> Result<AuthContext, AuthError> {
    match authenticate(headers, codec) {
        Err(AuthError::Unauthenticated) => Ok(AuthContext::anonymous()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};

    fn codec() -> TokenCodec {
        TokenCodec::new("guard-test-secret", Duration::hours(1))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header() {
        let result = authenticate(&HeaderMap::new(), &codec());
        assert_eq!(result, Err(AuthError::Unauthenticated));
    }

    #[test]
    fn test_malformed_header() {
        let codec = codec();
        for value in ["Bearer", "Token abc", "justatoken", "Bearer  ", "Bearer a b"] {
            let result = authenticate(&headers_with(value), &codec);
            assert!(
                matches!(result, Err(AuthError::MalformedCredential(_))),
                "'{}' should be malformed, got {:?}",
                value,
                result
            );
        }
    }

    #[test]
    fn test_invalid_token() {
        let result = authenticate(&headers_with("Bearer not-a-token"), &codec());
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let token = codec
            .issue_at(1, "alice", Utc::now() - Duration::hours(2))
            .unwrap();

        let result = authenticate(&headers_with(&format!("Bearer {}", token)), &codec);
        assert_eq!(result, Err(AuthError::InvalidToken("Token expired".to_string())));
    }

    #[test]
    fn test_valid_token() {
        let codec = codec();
        let token = codec.issue(9, "bob").unwrap();

        let ctx = authenticate(&headers_with(&format!("Bearer {}", token)), &codec).unwrap();
        assert_eq!(ctx, AuthContext::authenticated(9));
        assert!(ctx.is_authenticated);
    }

    #[test]
    fn test_optional_without_header_is_anonymous() {
        let ctx = authenticate_optional(&HeaderMap::new(), &codec()).unwrap();
        assert_eq!(ctx, AuthContext::anonymous());
    }

    #[test]
    fn test_optional_with_bad_token_still_rejects() {
        let result = authenticate_optional(&headers_with("Bearer garbage"), &codec());
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
