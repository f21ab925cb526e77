/// Article writes
///
/// Creation records the caller as author. Update and delete are limited to
/// that author (articles without one can be changed by any signed-in user).
/// Categories and tags are referenced by name and resolved through the
/// [`taxonomy`](super::taxonomy) reconciler.
///
/// Tag semantics on write:
///
/// - `tags: None` leaves the current associations alone
/// - `tags: Some(list)` replaces them with exactly `list`
/// - `tags: Some(vec![])` clears them

use tracing::info;

use super::query::{load_detail, ArticleDetail};
use super::taxonomy::{resolve_category, resolve_tags};
use super::ContentError;
use crate::auth::authorization::{require_authenticated, require_owner};
use crate::auth::middleware::AuthContext;
use crate::models::article::{Article, ArticleChanges, NewArticle};
use crate::store::ContentStore;

/// Article fields accepted on create and update
#[derive(Debug, Clone, Default)]
pub struct ArticleInput {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: Option<bool>,

    /// Category name; created when it doesn't exist yet
    pub category: Option<String>,

    /// Tag names; created when they don't exist yet
    pub tags: Option<Vec<String>>,
}

impl ArticleInput {
    fn check(&self) -> Result<(), ContentError> {
        if self.title.trim().is_empty() {
            return Err(ContentError::Invalid("Title is required".to_string()));
        }
        if self.slug.trim().is_empty() {
            return Err(ContentError::Invalid("Slug is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(ContentError::Invalid("Content is required".to_string()));
        }
        Ok(())
    }
}

/// Category and tag IDs for an input
struct Resolved {
    category_id: Option<i64>,
    tag_ids: Option<Vec<i64>>,
}

async fn resolve<S>(store: &S, input: &ArticleInput) -> Result<Resolved, ContentError>
where
    S: ContentStore + ?Sized,
{
    let category_id = match input.category.as_deref() {
        Some(name) if !name.is_empty() => Some(resolve_category(store, name).await?.id),
        _ => None,
    };

    let tag_ids = match &input.tags {
        Some(names) => Some(
            resolve_tags(store, names)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect(),
        ),
        None => None,
    };

    Ok(Resolved {
        category_id,
        tag_ids,
    })
}

/// Finds a live article regardless of publication state
async fn find_for_write<S>(store: &S, slug: &str) -> Result<Article, ContentError>
where
    S: ContentStore + ?Sized,
{
    store
        .find_article_by_slug(slug, false)
        .await?
        .ok_or_else(|| ContentError::NotFound("Article".to_string()))
}

/// Creates an article authored by the caller
pub async fn create_article<S>(
    store: &S,
    auth: &AuthContext,
    input: ArticleInput,
) -> Result<ArticleDetail, ContentError>
where
    S: ContentStore + ?Sized,
{
    let author_id = require_authenticated(auth)?;
    input.check()?;
    let resolved = resolve(store, &input).await?;

    let article = store
        .create_article(NewArticle {
            title: input.title,
            slug: input.slug,
            content: input.content,
            excerpt: input.excerpt,
            published: input.published.unwrap_or(false),
            author_id: Some(author_id),
            category_id: resolved.category_id,
        })
        .await?;

    if let Some(tag_ids) = resolved.tag_ids {
        store.replace_article_tags(article.id, &tag_ids).await?;
    }

    info!(article_id = article.id, slug = %article.slug, author_id, "Article created");

    load_detail(store, article).await
}

/// Updates the article at `slug`; only its author may do so
pub async fn update_article<S>(
    store: &S,
    auth: &AuthContext,
    slug: &str,
    input: ArticleInput,
) -> Result<ArticleDetail, ContentError>
where
    S: ContentStore + ?Sized,
{
    let existing = find_for_write(store, slug).await?;
    require_owner(auth, existing.author_id)?;
    input.check()?;
    let resolved = resolve(store, &input).await?;

    let article = store
        .update_article(
            existing.id,
            ArticleChanges {
                title: input.title,
                slug: input.slug,
                content: input.content,
                excerpt: input.excerpt,
                published: input.published,
                category_id: resolved.category_id,
            },
        )
        .await?
        .ok_or_else(|| ContentError::NotFound("Article".to_string()))?;

    if let Some(tag_ids) = resolved.tag_ids {
        store.replace_article_tags(article.id, &tag_ids).await?;
    }

    info!(article_id = article.id, slug = %article.slug, "Article updated");

    load_detail(store, article).await
}

/// Soft-deletes the article at `slug`; only its author may do so
pub async fn delete_article<S>(
    store: &S,
    auth: &AuthContext,
    slug: &str,
) -> Result<(), ContentError>
where
    S: ContentStore + ?Sized,
{
    let existing = find_for_write(store, slug).await?;
    require_owner(auth, existing.author_id)?;

    if !store.soft_delete_article(existing.id).await? {
        return Err(ContentError::NotFound("Article".to_string()));
    }

    info!(article_id = existing.id, slug = %existing.slug, "Article deleted");
    Ok(())
}
