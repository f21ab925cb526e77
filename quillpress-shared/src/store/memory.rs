/// In-memory store
///
/// Keeps every table in a single `RwLock` so each operation sees a consistent
/// snapshot. The unique and foreign-key rules of the PostgreSQL schema are
/// enforced here as well and reported with the same constraint names, so
/// code above the store can't tell the two backends apart.
///
/// Used by the test suites and when the server runs without `DATABASE_URL`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    ArticleStore, StoreError, StoreResult, TaxonomyStore, UserStore, ARTICLES_SLUG_KEY,
    CATEGORIES_NAME_KEY, CATEGORIES_SLUG_KEY, TAGS_NAME_KEY, TAGS_SLUG_KEY, USERS_EMAIL_KEY,
    USERS_USERNAME_KEY,
};
use crate::models::article::{Article, ArticleChanges, ArticleFilter, ArticleSummary, NewArticle};
use crate::models::category::{Category, NewCategory};
use crate::models::tag::{NewTag, Tag};
use crate::models::user::{NewUser, User};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    articles: Vec<Article>,
    /// (article_id, tag_id)
    article_tags: BTreeSet<(i64, i64)>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_article(&self, id: i64) -> Option<&Article> {
        self.articles
            .iter()
            .find(|a| a.id == id && a.deleted_at.is_none())
    }

    fn category_name(&self, id: Option<i64>) -> Option<String> {
        let id = id?;
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    }

    fn has_tag_named(&self, article_id: i64, name: &str) -> bool {
        self.tags.iter().any(|t| {
            t.name == name && self.article_tags.contains(&(article_id, t.id))
        })
    }

    fn matches(&self, article: &Article, filter: &ArticleFilter) -> bool {
        if article.deleted_at.is_some() {
            return false;
        }
        if filter.published_only && !article.published {
            return false;
        }
        if let Some(category) = &filter.category {
            if self.category_name(article.category_id).as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(tag) = &filter.tag {
            if !self.has_tag_named(article.id, tag) {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let hit = article.title.to_lowercase().contains(&needle)
                || article.content.to_lowercase().contains(&needle)
                || article
                    .excerpt
                    .as_deref()
                    .map(|e| e.to_lowercase().contains(&needle))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        true
    }

    fn check_category_unique(&self, data: &NewCategory, except: Option<i64>) -> StoreResult<()> {
        let others = self.categories.iter().filter(|c| Some(c.id) != except);
        for c in others {
            if c.name == data.name {
                return Err(StoreError::UniqueViolation(CATEGORIES_NAME_KEY.to_string()));
            }
            if c.slug == data.slug {
                return Err(StoreError::UniqueViolation(CATEGORIES_SLUG_KEY.to_string()));
            }
        }
        Ok(())
    }

    fn check_tag_unique(&self, data: &NewTag, except: Option<i64>) -> StoreResult<()> {
        let others = self.tags.iter().filter(|t| Some(t.id) != except);
        for t in others {
            if t.name == data.name {
                return Err(StoreError::UniqueViolation(TAGS_NAME_KEY.to_string()));
            }
            if t.slug == data.slug {
                return Err(StoreError::UniqueViolation(TAGS_SLUG_KEY.to_string()));
            }
        }
        Ok(())
    }

    /// Soft-deleted articles still hold their slug
    fn check_article_slug(&self, slug: &str, except: Option<i64>) -> StoreResult<()> {
        if self
            .articles
            .iter()
            .any(|a| a.slug == slug && Some(a.id) != except)
        {
            return Err(StoreError::UniqueViolation(ARTICLES_SLUG_KEY.to_string()));
        }
        Ok(())
    }

    fn check_category_ref(&self, id: Option<i64>) -> StoreResult<()> {
        match id {
            Some(id) if !self.categories.iter().any(|c| c.id == id) => Err(
                StoreError::ForeignKeyViolation("articles_category_id_fkey".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// Store that lives entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::UniqueViolation(USERS_USERNAME_KEY.to_string()));
        }
        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::UniqueViolation(USERS_EMAIL_KEY.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: tables.allocate_id(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        let by_name = tables.users.iter().find(|u| u.username == login);
        Ok(by_name
            .or_else(|| tables.users.iter().find(|u| u.email == login))
            .cloned())
    }

    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }
}

#[async_trait]
impl TaxonomyStore for MemoryStore {
    async fn create_category(&self, data: NewCategory) -> StoreResult<Category> {
        let mut tables = self.tables.write().await;
        tables.check_category_unique(&data, None)?;

        let now = Utc::now();
        let category = Category {
            id: tables.allocate_id(),
            name: data.name,
            slug: data.slug,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn find_category_by_id(&self, id: i64) -> StoreResult<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn find_category_by_name_or_slug(&self, key: &str) -> StoreResult<Option<Category>> {
        let tables = self.tables.read().await;
        let by_name = tables.categories.iter().find(|c| c.name == key);
        Ok(by_name
            .or_else(|| tables.categories.iter().find(|c| c.slug == key))
            .cloned())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn update_category(&self, id: i64, data: NewCategory) -> StoreResult<Option<Category>> {
        let mut tables = self.tables.write().await;
        if !tables.categories.iter().any(|c| c.id == id) {
            return Ok(None);
        }
        tables.check_category_unique(&data, Some(id))?;

        let category = tables.categories.iter_mut().find(|c| c.id == id);
        Ok(category.map(|c| {
            c.name = data.name;
            c.slug = data.slug;
            c.description = data.description;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_category(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Ok(false);
        }

        // ON DELETE SET NULL
        for article in tables.articles.iter_mut() {
            if article.category_id == Some(id) {
                article.category_id = None;
            }
        }
        Ok(true)
    }

    async fn create_tag(&self, data: NewTag) -> StoreResult<Tag> {
        let mut tables = self.tables.write().await;
        tables.check_tag_unique(&data, None)?;

        let now = Utc::now();
        let tag = Tag {
            id: tables.allocate_id(),
            name: data.name,
            slug: data.slug,
            created_at: now,
            updated_at: now,
        };
        tables.tags.push(tag.clone());
        Ok(tag)
    }

    async fn find_tag_by_slug(&self, slug: &str) -> StoreResult<Option<Tag>> {
        let tables = self.tables.read().await;
        Ok(tables.tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn find_tag_by_name_or_slug(&self, key: &str) -> StoreResult<Option<Tag>> {
        let tables = self.tables.read().await;
        let by_name = tables.tags.iter().find(|t| t.name == key);
        Ok(by_name
            .or_else(|| tables.tags.iter().find(|t| t.slug == key))
            .cloned())
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        Ok(self.tables.read().await.tags.clone())
    }

    async fn update_tag(&self, id: i64, data: NewTag) -> StoreResult<Option<Tag>> {
        let mut tables = self.tables.write().await;
        if !tables.tags.iter().any(|t| t.id == id) {
            return Ok(None);
        }
        tables.check_tag_unique(&data, Some(id))?;

        let tag = tables.tags.iter_mut().find(|t| t.id == id);
        Ok(tag.map(|t| {
            t.name = data.name;
            t.slug = data.slug;
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn delete_tag(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.tags.len();
        tables.tags.retain(|t| t.id != id);
        if tables.tags.len() == before {
            return Ok(false);
        }

        // ON DELETE CASCADE
        tables.article_tags.retain(|&(_, tag_id)| tag_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn create_article(&self, data: NewArticle) -> StoreResult<Article> {
        let mut tables = self.tables.write().await;
        tables.check_article_slug(&data.slug, None)?;
        tables.check_category_ref(data.category_id)?;
        if let Some(author) = data.author_id {
            if !tables.users.iter().any(|u| u.id == author) {
                return Err(StoreError::ForeignKeyViolation(
                    "articles_author_id_fkey".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let article = Article {
            id: tables.allocate_id(),
            title: data.title,
            slug: data.slug,
            content: data.content,
            excerpt: data.excerpt,
            published: data.published,
            author_id: data.author_id,
            category_id: data.category_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.articles.push(article.clone());
        Ok(article)
    }

    async fn find_article_by_slug(
        &self,
        slug: &str,
        published_only: bool,
    ) -> StoreResult<Option<Article>> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .iter()
            .find(|a| a.slug == slug && a.deleted_at.is_none())
            .filter(|a| a.published || !published_only)
            .cloned())
    }

    async fn update_article(
        &self,
        id: i64,
        changes: ArticleChanges,
    ) -> StoreResult<Option<Article>> {
        let mut tables = self.tables.write().await;
        if tables.live_article(id).is_none() {
            return Ok(None);
        }
        tables.check_article_slug(&changes.slug, Some(id))?;
        tables.check_category_ref(changes.category_id)?;

        let article = tables.articles.iter_mut().find(|a| a.id == id);
        Ok(article.map(|a| {
            a.title = changes.title;
            a.slug = changes.slug;
            a.content = changes.content;
            if changes.excerpt.is_some() {
                a.excerpt = changes.excerpt;
            }
            if let Some(published) = changes.published {
                a.published = published;
            }
            if changes.category_id.is_some() {
                a.category_id = changes.category_id;
            }
            a.updated_at = Utc::now();
            a.clone()
        }))
    }

    async fn soft_delete_article(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .articles
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())
        {
            Some(article) => {
                article.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace_article_tags(&self, id: i64, tag_ids: &[i64]) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.articles.iter().any(|a| a.id == id) {
            return Err(StoreError::ForeignKeyViolation(
                "article_tags_article_id_fkey".to_string(),
            ));
        }
        if let Some(missing) = tag_ids
            .iter()
            .find(|tag_id| !tables.tags.iter().any(|t| t.id == **tag_id))
        {
            return Err(StoreError::ForeignKeyViolation(format!(
                "article_tags_tag_id_fkey ({})",
                missing
            )));
        }

        tables.article_tags.retain(|&(article_id, _)| article_id != id);
        for tag_id in tag_ids {
            tables.article_tags.insert((id, *tag_id));
        }
        Ok(())
    }

    async fn article_tags(&self, id: i64) -> StoreResult<Vec<Tag>> {
        let tables = self.tables.read().await;
        let mut tags: Vec<Tag> = tables
            .tags
            .iter()
            .filter(|t| tables.article_tags.contains(&(id, t.id)))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ArticleSummary>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Article> = tables
            .articles
            .iter()
            .filter(|a| tables.matches(a, filter))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|a| ArticleSummary {
                id: a.id,
                title: a.title.clone(),
                slug: a.slug.clone(),
                excerpt: a.excerpt.clone(),
                published: a.published,
                created_at: a.created_at,
                updated_at: a.updated_at,
                category: tables.category_name(a.category_id),
            })
            .collect())
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .iter()
            .filter(|a| tables.matches(a, filter))
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_article(slug: &str, published: bool) -> NewArticle {
        NewArticle {
            title: format!("Title {}", slug),
            slug: slug.to_string(),
            content: "body".to_string(),
            excerpt: None,
            published,
            author_id: None,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn test_user_unique_constraints() {
        let store = MemoryStore::new();
        let alice = NewUser {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "h".to_string(),
        };
        store.create_user(alice.clone()).await.unwrap();

        let err = store.create_user(alice.clone()).await.unwrap_err();
        assert_eq!(err, StoreError::UniqueViolation(USERS_USERNAME_KEY.into()));

        let err = store
            .create_user(NewUser {
                username: "alice2".to_string(),
                ..alice.clone()
            })
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::UniqueViolation(USERS_EMAIL_KEY.into()));

        // Usernames are case-sensitive
        store
            .create_user(NewUser {
                username: "Alice".to_string(),
                email: "b@x.com".to_string(),
                password_hash: "h".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(store.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_login_lookup_prefers_username() {
        let store = MemoryStore::new();
        let first = store
            .create_user(NewUser {
                username: "b@x.com".to_string(),
                email: "first@x.com".to_string(),
                password_hash: "h".to_string(),
            })
            .await
            .unwrap();
        let second = store
            .create_user(NewUser {
                username: "bob".to_string(),
                email: "b@x.com".to_string(),
                password_hash: "h".to_string(),
            })
            .await
            .unwrap();

        let found = store.find_user_by_login("b@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        let found = store.find_user_by_login("bob").await.unwrap().unwrap();
        assert_eq!(found.id, second.id);
        assert!(store.find_user_by_login("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_category_clears_reference() {
        let store = MemoryStore::new();
        let category = store
            .create_category(NewCategory {
                name: "Rust".to_string(),
                slug: "rust".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let article = store
            .create_article(NewArticle {
                category_id: Some(category.id),
                ..new_article("a", true)
            })
            .await
            .unwrap();

        assert!(store.delete_category(category.id).await.unwrap());
        assert!(!store.delete_category(category.id).await.unwrap());

        let reloaded = store.find_article_by_slug("a", false).await.unwrap().unwrap();
        assert_eq!(reloaded.id, article.id);
        assert_eq!(reloaded.category_id, None);
    }

    #[tokio::test]
    async fn test_deleting_tag_drops_associations() {
        let store = MemoryStore::new();
        let tag = store
            .create_tag(NewTag {
                name: "db".to_string(),
                slug: "db".to_string(),
            })
            .await
            .unwrap();
        let article = store.create_article(new_article("a", true)).await.unwrap();
        store.replace_article_tags(article.id, &[tag.id]).await.unwrap();
        assert_eq!(store.article_tags(article.id).await.unwrap().len(), 1);

        store.delete_tag(tag.id).await.unwrap();
        assert!(store.article_tags(article.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_article_is_hidden_but_keeps_slug() {
        let store = MemoryStore::new();
        let article = store.create_article(new_article("gone", true)).await.unwrap();

        assert!(store.soft_delete_article(article.id).await.unwrap());
        assert!(!store.soft_delete_article(article.id).await.unwrap());
        assert!(store.find_article_by_slug("gone", false).await.unwrap().is_none());
        assert_eq!(store.count_articles(&ArticleFilter::default()).await.unwrap(), 0);

        let err = store.create_article(new_article("gone", true)).await.unwrap_err();
        assert_eq!(err, StoreError::UniqueViolation(ARTICLES_SLUG_KEY.into()));
    }

    #[tokio::test]
    async fn test_update_keeps_absent_optionals() {
        let store = MemoryStore::new();
        let article = store
            .create_article(NewArticle {
                excerpt: Some("short".to_string()),
                ..new_article("a", true)
            })
            .await
            .unwrap();

        let updated = store
            .update_article(
                article.id,
                ArticleChanges {
                    title: "New".to_string(),
                    slug: "a".to_string(),
                    content: "new body".to_string(),
                    excerpt: None,
                    published: None,
                    category_id: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.excerpt.as_deref(), Some("short"));
        assert!(updated.published);
    }

    #[tokio::test]
    async fn test_listing_filters_and_order() {
        let store = MemoryStore::new();
        for slug in ["one", "two", "three"] {
            store.create_article(new_article(slug, true)).await.unwrap();
        }
        store.create_article(new_article("draft", false)).await.unwrap();

        let public = ArticleFilter {
            published_only: true,
            ..Default::default()
        };
        assert_eq!(store.count_articles(&public).await.unwrap(), 3);
        assert_eq!(store.count_articles(&ArticleFilter::default()).await.unwrap(), 4);

        let page = store.list_articles(&public, 2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|a| a.published));

        let search = ArticleFilter {
            search: Some("TITLE TW".to_string()),
            ..Default::default()
        };
        let hits = store.list_articles(&search, 10, 0).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "two");
    }

    #[tokio::test]
    async fn test_listing_orders_newest_first_then_by_id() {
        let store = MemoryStore::new();
        for slug in ["a", "b", "c", "d"] {
            store.create_article(new_article(slug, true)).await.unwrap();
        }

        {
            let same = chrono::Utc::now();
            let mut tables = store.tables.write().await;
            for article in tables.articles.iter_mut() {
                article.created_at = match article.slug.as_str() {
                    "b" => same + chrono::Duration::seconds(10),
                    "a" => same - chrono::Duration::seconds(10),
                    _ => same,
                };
            }
        }

        let rows = store.list_articles(&ArticleFilter::default(), 10, 0).await.unwrap();
        let slugs: Vec<&str> = rows.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "c", "d", "a"]);

        let second_page = store.list_articles(&ArticleFilter::default(), 2, 2).await.unwrap();
        let slugs: Vec<&str> = second_page.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["d", "a"]);
    }

    #[tokio::test]
    async fn test_replace_tags_rejects_unknown_tag() {
        let store = MemoryStore::new();
        let article = store.create_article(new_article("a", true)).await.unwrap();
        let err = store.replace_article_tags(article.id, &[999]).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }
}
