/// Response envelope
///
/// ```json
/// { "success": true, "message": "Article deleted" }
/// ```
///
/// Successful responses that carry only data skip the envelope and return
/// the data itself; the envelope is used for messages and errors.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Success with a message and optional data
    pub fn message(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
            error: None,
        }
    }

    /// Failure with an error code and a human-readable message
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error: Some(code.into()),
        }
    }
}

/// 200 with a bare message envelope
pub fn message(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse::message(message, None))
}

/// 201 with the created resource as the body
pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::<()>::message("done", None)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "message": "done" }));
    }

    #[test]
    fn test_error_envelope() {
        let json = serde_json::to_value(ApiResponse::<()>::error("conflict", "taken")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "conflict");
        assert_eq!(json["message"], "taken");
        assert!(json.get("data").is_none());
    }
}
