/// Authentication layers
///
/// Both layers validate the bearer token with the state's `TokenCodec` and
/// insert an `AuthContext` into the request extensions. Handlers read it with
/// `Extension<AuthContext>`.
///
/// - [`require_auth`]: rejects requests without a valid credential
/// - [`optional_auth`]: lets anonymous requests through with
///   `AuthContext::anonymous()`, but still rejects a bad credential
///
/// # Example
///
/// ```no_run
/// use axum::{middleware::from_fn_with_state, routing::post, Router};
/// use quillpress_api::app::AppState;
/// use quillpress_api::middleware::auth::require_auth;
///
/// # fn example(state: AppState) -> Router<AppState> {
/// Router::new()
///     .route("/private", post(|| async { "ok" }))
///     .layer(from_fn_with_state(state, require_auth))
/// # }
/// ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use quillpress_shared::auth::middleware::{authenticate, authenticate_optional};

use crate::{app::AppState, error::ApiError};

/// Requires a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = authenticate(req.headers(), &state.tokens)?;
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Accepts anonymous requests, rejects bad credentials
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = authenticate_optional(req.headers(), &state.tokens)?;
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
