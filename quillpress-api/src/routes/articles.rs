/// Article endpoints
///
/// Reads run behind the optional auth layer: anonymous callers only see
/// published articles. Writes need a token, and update/delete are limited to
/// the article's author.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use quillpress_shared::auth::middleware::AuthContext;
use quillpress_shared::content::articles::{self, ArticleInput};
use quillpress_shared::content::query::{self, ArticleDetail, ListParams, Page};
use quillpress_shared::models::article::ArticleSummary;
use serde::Deserialize;
use validator::Validate;

use super::ValidatedJson;
use crate::{app::AppState, error::ApiResult, response};

/// Body of create and update requests
#[derive(Debug, Deserialize, Validate)]
pub struct ArticleRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 255, message = "Slug must be 1 to 255 characters"))]
    pub slug: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    pub excerpt: Option<String>,
    pub published: Option<bool>,

    /// Category name
    pub category: Option<String>,

    /// Tag names; omit to keep the current tags, `[]` to clear them
    pub tags: Option<Vec<String>>,
}

impl From<ArticleRequest> for ArticleInput {
    fn from(req: ArticleRequest) -> Self {
        Self {
            title: req.title,
            slug: req.slug,
            content: req.content,
            excerpt: req.excerpt,
            published: req.published,
            category: req.category,
            tags: req.tags,
        }
    }
}

/// `GET /api/articles?page&page_size&category&tag&search`
pub async fn list_articles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<ArticleSummary>>> {
    let page = query::list_articles(state.store.as_ref(), &auth, &params, &state.config.paging)
        .await?;
    Ok(Json(page))
}

/// `GET /api/articles/:slug`
pub async fn get_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleDetail>> {
    let detail = query::get_article(state.store.as_ref(), &auth, &slug).await?;
    Ok(Json(detail))
}

/// `POST /api/articles`
pub async fn create_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<ArticleRequest>,
) -> ApiResult<impl IntoResponse> {
    let detail = articles::create_article(state.store.as_ref(), &auth, req.into()).await?;
    Ok(response::created(detail))
}

/// `PUT /api/articles/:slug`
pub async fn update_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
    ValidatedJson(req): ValidatedJson<ArticleRequest>,
) -> ApiResult<Json<ArticleDetail>> {
    let detail = articles::update_article(state.store.as_ref(), &auth, &slug, req.into()).await?;
    Ok(Json(detail))
}

/// `DELETE /api/articles/:slug`
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    articles::delete_article(state.store.as_ref(), &auth, &slug).await?;
    Ok(response::message("Article deleted successfully"))
}
