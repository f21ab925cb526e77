/// Tag model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL CONSTRAINT tags_name_key UNIQUE,
///     slug VARCHAR(255) NOT NULL CONSTRAINT tags_slug_key UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a tag
#[derive(Debug, Clone, Default)]
pub struct NewTag {
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub async fn create(pool: &PgPool, data: NewTag) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.slug)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "SELECT id, name, slug, created_at, updated_at FROM tags WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    /// Finds the tag whose name or slug equals `key` exactly
    pub async fn find_by_name_or_slug(pool: &PgPool, key: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, slug, created_at, updated_at
            FROM tags
            WHERE name = $1 OR slug = $1
            ORDER BY (name = $1) DESC, id
            LIMIT 1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug, created_at, updated_at FROM tags ORDER BY id")
            .fetch_all(pool)
            .await
    }

    pub async fn update(pool: &PgPool, id: i64, data: NewTag) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
            SET name = $2, slug = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, slug, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.slug)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a tag and, by cascade, its article associations
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
