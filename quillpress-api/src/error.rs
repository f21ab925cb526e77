/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Errors render as the standard
/// envelope with `success: false`:
///
/// ```json
/// { "success": false, "error": "not_found", "message": "Article not found" }
/// ```
///
/// Internal failures are logged with their detail and reach the client only
/// as a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quillpress_shared::auth::authorization::AuthzError;
use quillpress_shared::auth::middleware::AuthError;
use quillpress_shared::auth::password::PasswordError;
use quillpress_shared::auth::token::TokenError;
use quillpress_shared::content::{conflict_message, ContentError};
use quillpress_shared::store::StoreError;

use crate::response::ApiResponse;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Request body or parameters failed validation (400)
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Missing, malformed, invalid or expired credential, or bad login (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller may not touch the resource (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource doesn't exist or is hidden from the caller (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique value already taken (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store, hashing or signing failure (500)
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "validation_error",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match self {
            ApiError::InternalError(detail) => {
                tracing::error!(error = %detail, "Internal error");
                "An internal error occurred".to_string()
            }
            ApiError::ValidationError(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
        };

        (status, Json(ApiResponse::<()>::error(code, message))).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                errs.first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
            .collect();
        fields.sort();

        ApiError::ValidationError(fields.join("; "))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthorized(err.to_string()),
            AuthzError::Forbidden => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::CreateError(msg) => {
                ApiError::InternalError(format!("Token signing failed: {}", msg))
            }
            TokenError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            TokenError::Invalid(msg) => ApiError::Unauthorized(format!("Invalid token: {}", msg)),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            StoreError::UniqueViolation(constraint) => {
                ApiError::Conflict(conflict_message(&constraint))
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            ContentError::Invalid(msg) => ApiError::ValidationError(msg),
            ContentError::Conflict(msg) => ApiError::Conflict(msg),
            ContentError::Authz(e) => e.into(),
            ContentError::Internal(msg) => ApiError::InternalError(msg),
            ContentError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::ValidationError("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::InternalError("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_content_errors_convert() {
        let err: ApiError = ContentError::Authz(AuthzError::Forbidden).into();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err: ApiError = ContentError::NotFound("Article".into()).into();
        assert_eq!(err, ApiError::NotFound("Article not found".into()));

        let err: ApiError = StoreError::UniqueViolation("users_email_key".into()).into();
        assert_eq!(err, ApiError::Conflict("Email already exists".into()));

        let err: ApiError = StoreError::Database("connection reset".into()).into();
        assert!(matches!(err, ApiError::InternalError(_)));
    }

    #[test]
    fn test_every_auth_failure_is_unauthorized() {
        for err in [
            AuthError::Unauthenticated,
            AuthError::MalformedCredential("x".into()),
            AuthError::InvalidToken("x".into()),
        ] {
            assert_eq!(ApiError::from(err).status(), StatusCode::UNAUTHORIZED);
        }
    }
}
