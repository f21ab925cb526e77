/// PostgreSQL store
///
/// Thin adapter from the store traits to the model SQL. Every sqlx error is
/// classified through `From<sqlx::Error> for StoreError`.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{ArticleStore, StoreResult, TaxonomyStore, UserStore};
use crate::models::article::{Article, ArticleChanges, ArticleFilter, ArticleSummary, NewArticle};
use crate::models::category::{Category, NewCategory};
use crate::models::tag::{NewTag, Tag};
use crate::models::user::{NewUser, User};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_login(&self.pool, login).await?)
    }

    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        Ok(User::exists(&self.pool, username, email).await?)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(User::count(&self.pool).await?)
    }
}

#[async_trait]
impl TaxonomyStore for PgStore {
    async fn create_category(&self, data: NewCategory) -> StoreResult<Category> {
        Ok(Category::create(&self.pool, data).await?)
    }

    async fn find_category_by_id(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(Category::find_by_id(&self.pool, id).await?)
    }

    async fn find_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        Ok(Category::find_by_slug(&self.pool, slug).await?)
    }

    async fn find_category_by_name_or_slug(&self, key: &str) -> StoreResult<Option<Category>> {
        Ok(Category::find_by_name_or_slug(&self.pool, key).await?)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(Category::list(&self.pool).await?)
    }

    async fn update_category(&self, id: i64, data: NewCategory) -> StoreResult<Option<Category>> {
        Ok(Category::update(&self.pool, id, data).await?)
    }

    async fn delete_category(&self, id: i64) -> StoreResult<bool> {
        Ok(Category::delete(&self.pool, id).await?)
    }

    async fn create_tag(&self, data: NewTag) -> StoreResult<Tag> {
        Ok(Tag::create(&self.pool, data).await?)
    }

    async fn find_tag_by_slug(&self, slug: &str) -> StoreResult<Option<Tag>> {
        Ok(Tag::find_by_slug(&self.pool, slug).await?)
    }

    async fn find_tag_by_name_or_slug(&self, key: &str) -> StoreResult<Option<Tag>> {
        Ok(Tag::find_by_name_or_slug(&self.pool, key).await?)
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        Ok(Tag::list(&self.pool).await?)
    }

    async fn update_tag(&self, id: i64, data: NewTag) -> StoreResult<Option<Tag>> {
        Ok(Tag::update(&self.pool, id, data).await?)
    }

    async fn delete_tag(&self, id: i64) -> StoreResult<bool> {
        Ok(Tag::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl ArticleStore for PgStore {
    async fn create_article(&self, data: NewArticle) -> StoreResult<Article> {
        Ok(Article::create(&self.pool, data).await?)
    }

    async fn find_article_by_slug(
        &self,
        slug: &str,
        published_only: bool,
    ) -> StoreResult<Option<Article>> {
        Ok(Article::find_by_slug(&self.pool, slug, published_only).await?)
    }

    async fn update_article(
        &self,
        id: i64,
        changes: ArticleChanges,
    ) -> StoreResult<Option<Article>> {
        Ok(Article::update(&self.pool, id, changes).await?)
    }

    async fn soft_delete_article(&self, id: i64) -> StoreResult<bool> {
        Ok(Article::soft_delete(&self.pool, id).await?)
    }

    async fn replace_article_tags(&self, id: i64, tag_ids: &[i64]) -> StoreResult<()> {
        Ok(Article::replace_tags(&self.pool, id, tag_ids).await?)
    }

    async fn article_tags(&self, id: i64) -> StoreResult<Vec<Tag>> {
        Ok(Article::tags(&self.pool, id).await?)
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ArticleSummary>> {
        Ok(Article::list(&self.pool, filter, limit, offset).await?)
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64> {
        Ok(Article::count(&self.pool, filter).await?)
    }
}
