/// Authentication endpoints
///
/// - `POST /api/auth/register`: Create an account and get a token
/// - `POST /api/auth/login`: Exchange credentials for a token
/// - `GET /api/auth/user`: The account behind the presented token

use axum::{extract::State, response::IntoResponse, Extension, Json};
use quillpress_shared::auth::middleware::AuthContext;
use quillpress_shared::auth::authorization::require_authenticated;
use quillpress_shared::auth::password;
use quillpress_shared::models::user::{NewUser, User};
use quillpress_shared::store::UserStore;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::ValidatedJson;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response,
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30, message = "Username must be 3 to 30 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
///
/// `username` may also be the account's email address.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Body of register and login responses
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: String,
}

/// Hashes on the blocking pool
async fn hash_blocking(plaintext: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))?
        .map_err(Into::into)
}

async fn verify_blocking(plaintext: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))?
        .map_err(Into::into)
}

/// Registers a new account
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Username or email already registered
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if state.store.user_exists(&req.username, &req.email).await? {
        return Err(ApiError::Conflict(
            "Username or email already exists".to_string(),
        ));
    }

    let password_hash = hash_blocking(req.password).await?;

    // Unique constraints still catch a concurrent registration (409)
    let user = state
        .store
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;

    let token = state.tokens.issue(user.id, &user.username)?;
    info!(user_id = user.id, username = %user.username, "User registered");

    Ok(response::created(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Logs in with username (or email) and password
///
/// Unknown accounts and wrong passwords get the same 401.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = state
        .store
        .find_user_by_login(&req.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_blocking(req.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    let token = state.tokens.issue(user.id, &user.username)?;
    info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Returns the caller's account
pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserView>> {
    let user_id = require_authenticated(&auth)?;

    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
