/// Category endpoints
///
/// Anyone may read. Any signed-in user may create, change or delete a
/// category; categories have no owner. Deleting a category leaves its
/// articles uncategorized.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use quillpress_shared::auth::authorization::require_authenticated;
use quillpress_shared::auth::middleware::AuthContext;
use quillpress_shared::models::category::{Category, NewCategory};
use quillpress_shared::store::TaxonomyStore;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::ValidatedJson;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Slug must be 1 to 255 characters"))]
    pub slug: String,

    #[serde(default)]
    pub description: String,
}

impl From<CategoryRequest> for NewCategory {
    fn from(req: CategoryRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            description: req.description,
        }
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Category not found".to_string())
}

async fn find(state: &AppState, slug: &str) -> ApiResult<Category> {
    state
        .store
        .find_category_by_slug(slug)
        .await?
        .ok_or_else(not_found)
}

/// `GET /api/categories`
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.store.list_categories().await?))
}

/// `GET /api/categories/:slug`
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(find(&state, &slug).await?))
}

/// `POST /api/categories`
pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    require_authenticated(&auth)?;

    let category = state.store.create_category(req.into()).await?;
    info!(category_id = category.id, slug = %category.slug, "Category created");

    Ok(response::created(category))
}

/// `PUT /api/categories/:slug`
pub async fn update_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    require_authenticated(&auth)?;
    let existing = find(&state, &slug).await?;

    let category = state
        .store
        .update_category(existing.id, req.into())
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(category))
}

/// `DELETE /api/categories/:slug`
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    require_authenticated(&auth)?;
    let existing = find(&state, &slug).await?;

    if !state.store.delete_category(existing.id).await? {
        return Err(not_found());
    }
    info!(category_id = existing.id, "Category deleted");

    Ok(response::message("Category deleted successfully"))
}
