/// API route handlers
///
/// - `auth`: Registration, login and the current user
/// - `articles`: Article listing, detail and author-only writes
/// - `categories`: Category CRUD
/// - `tags`: Tag CRUD

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

pub mod articles;
pub mod auth;
pub mod categories;
pub mod tags;

/// JSON body that is validated before the handler runs
///
/// Malformed JSON and rule violations both become a 400 in the standard
/// error envelope.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::ValidationError(rejection.body_text()))?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
