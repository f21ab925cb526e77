/// Tag endpoints
///
/// Same access rules as categories. Deleting a tag detaches it from every
/// article.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use quillpress_shared::auth::authorization::require_authenticated;
use quillpress_shared::auth::middleware::AuthContext;
use quillpress_shared::models::tag::{NewTag, Tag};
use quillpress_shared::store::TaxonomyStore;
use serde::Deserialize;
use validator::Validate;

use super::ValidatedJson;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response,
};

#[derive(Debug, Deserialize, Validate)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Slug must be 1 to 255 characters"))]
    pub slug: String,
}

impl From<TagRequest> for NewTag {
    fn from(req: TagRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
        }
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Tag not found".to_string())
}

async fn find(state: &AppState, slug: &str) -> ApiResult<Tag> {
    state.store.find_tag_by_slug(slug).await?.ok_or_else(not_found)
}

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.store.list_tags().await?))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Tag>> {
    Ok(Json(find(&state, &slug).await?))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<TagRequest>,
) -> ApiResult<impl IntoResponse> {
    require_authenticated(&auth)?;
    let tag = state.store.create_tag(req.into()).await?;
    Ok(response::created(tag))
}

pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
    ValidatedJson(req): ValidatedJson<TagRequest>,
) -> ApiResult<Json<Tag>> {
    require_authenticated(&auth)?;
    let existing = find(&state, &slug).await?;

    let tag = state
        .store
        .update_tag(existing.id, req.into())
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(tag))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    require_authenticated(&auth)?;
    let existing = find(&state, &slug).await?;

    if !state.store.delete_tag(existing.id).await? {
        return Err(not_found());
    }

    Ok(response::message("Tag deleted successfully"))
}
