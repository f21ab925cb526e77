/// Article model, tag associations and the listing query
///
/// # Schema
///
/// ```sql
/// CREATE TABLE articles (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL CONSTRAINT articles_slug_key UNIQUE,
///     content TEXT NOT NULL,
///     excerpt TEXT,
///     published BOOLEAN NOT NULL DEFAULT FALSE,
///     author_id BIGINT REFERENCES users (id) ON DELETE SET NULL,
///     category_id BIGINT REFERENCES categories (id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
///
/// CREATE TABLE article_tags (
///     article_id BIGINT NOT NULL REFERENCES articles (id) ON DELETE CASCADE,
///     tag_id BIGINT NOT NULL REFERENCES tags (id) ON DELETE CASCADE,
///     PRIMARY KEY (article_id, tag_id)
/// );
/// ```
///
/// Deleting an article only stamps `deleted_at`. Every query in this module
/// skips stamped rows, but they stay in the table (and keep their slug).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::tag::Tag;

const ARTICLE_COLUMNS: &str = "id, title, slug, content, excerpt, published, author_id, \
                               category_id, created_at, updated_at, deleted_at";

/// Article row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: bool,

    /// Author; fixed at creation, NULL for orphaned articles
    pub author_id: Option<i64>,

    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

/// List projection of an article: no body, category resolved to its name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Input for creating an article
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: bool,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
}

/// Changes applied by an article update
///
/// Title, slug and content are always replaced. The optional fields keep
/// their stored value when None. The author can never be changed.
#[derive(Debug, Clone)]
pub struct ArticleChanges {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: Option<bool>,
    pub category_id: Option<i64>,
}

/// Filters for the article listing
///
/// All present filters must match. `published_only` is set for callers that
/// are not signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub published_only: bool,

    /// Exact category name
    pub category: Option<String>,

    /// Exact tag name
    pub tag: Option<String>,

    /// Case-insensitive substring of title, content or excerpt
    pub search: Option<String>,
}

/// Escapes LIKE wildcards so the search term matches literally
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
    builder.push(" WHERE a.deleted_at IS NULL");

    if filter.published_only {
        builder.push(" AND a.published = TRUE");
    }

    if let Some(category) = &filter.category {
        builder.push(" AND c.name = ");
        builder.push_bind(category.clone());
    }

    if let Some(tag) = &filter.tag {
        builder.push(
            " AND EXISTS (SELECT 1 FROM article_tags at JOIN tags t ON t.id = at.tag_id \
             WHERE at.article_id = a.id AND t.name = ",
        );
        builder.push_bind(tag.clone());
        builder.push(")");
    }

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder.push(" AND (a.title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR a.content ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR a.excerpt ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

impl Article {
    pub async fn create(pool: &PgPool, data: NewArticle) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO articles (title, slug, content, excerpt, published, author_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ARTICLE_COLUMNS
        );

        sqlx::query_as::<_, Article>(&sql)
            .bind(data.title)
            .bind(data.slug)
            .bind(data.content)
            .bind(data.excerpt)
            .bind(data.published)
            .bind(data.author_id)
            .bind(data.category_id)
            .fetch_one(pool)
            .await
    }

    /// Finds a live article by slug
    ///
    /// With `published_only` set, drafts are treated as absent.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
        published_only: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM articles WHERE slug = $1 AND deleted_at IS NULL AND (published OR NOT $2)",
            ARTICLE_COLUMNS
        );

        sqlx::query_as::<_, Article>(&sql)
            .bind(slug)
            .bind(published_only)
            .fetch_optional(pool)
            .await
    }

    /// Applies `changes` to a live article
    ///
    /// Returns None if the article doesn't exist or was deleted.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: ArticleChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE articles
            SET title = $2,
                slug = $3,
                content = $4,
                excerpt = COALESCE($5, excerpt),
                published = COALESCE($6, published),
                category_id = COALESCE($7, category_id),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            ARTICLE_COLUMNS
        );

        sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.slug)
            .bind(changes.content)
            .bind(changes.excerpt)
            .bind(changes.published)
            .bind(changes.category_id)
            .fetch_optional(pool)
            .await
    }

    /// Marks an article as deleted
    ///
    /// Returns false if it was already gone.
    pub async fn soft_delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE articles SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the full tag set of an article in one transaction
    pub async fn replace_tags(pool: &PgPool, id: i64, tag_ids: &[i64]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if !tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO article_tags (article_id, tag_id)
                SELECT $1, UNNEST($2::BIGINT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Tags attached to an article, ordered by name
    pub async fn tags(pool: &PgPool, id: i64) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.slug, t.created_at, t.updated_at
            FROM tags t
            JOIN article_tags at ON at.tag_id = t.id
            WHERE at.article_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    /// One page of article summaries, newest first
    ///
    /// Rows created at the same instant keep insertion order.
    pub async fn list(
        pool: &PgPool,
        filter: &ArticleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ArticleSummary>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT a.id, a.title, a.slug, a.excerpt, a.published, a.created_at, a.updated_at, \
             c.name AS category \
             FROM articles a LEFT JOIN categories c ON c.id = a.category_id",
        );
        push_filters(&mut builder, filter);

        builder.push(" ORDER BY a.created_at DESC, a.id ASC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        builder.build_query_as::<ArticleSummary>().fetch_all(pool).await
    }

    /// Number of articles matching `filter`, ignoring pagination
    pub async fn count(pool: &PgPool, filter: &ArticleFilter) -> Result<i64, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM articles a LEFT JOIN categories c ON c.id = a.category_id",
        );
        push_filters(&mut builder, filter);

        let (count,): (i64,) = builder.build_query_as().fetch_one(pool).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\dir"), "%c:\\\\dir%");
    }

    #[test]
    fn test_summary_omits_missing_optionals() {
        let summary = ArticleSummary {
            id: 1,
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            excerpt: None,
            published: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            category: None,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("excerpt").is_none());
        assert!(json.get("category").is_none());
        assert!(json.get("content").is_none());
        assert_eq!(json["slug"], "hello");
    }
}
