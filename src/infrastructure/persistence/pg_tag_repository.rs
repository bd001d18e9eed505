//! PostgreSQL implementation of the tag repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewTag, Tag};
use crate::domain::repositories::TagRepository;
use crate::error::AppError;

type TagRow = (i64, String, DateTime<Utc>);

/// PostgreSQL repository for account tags.
///
/// Uniqueness is enforced by the `(account_id, LOWER(name))` index, so a
/// duplicate insert surfaces as [`AppError::Conflict`].
pub struct PgTagRepository {
    pool: Arc<PgPool>,
}

impl PgTagRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self, account_id: &str) -> Result<Vec<Tag>, AppError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT id, name, created_at
            FROM tags
            WHERE account_id = $1
            ORDER BY LOWER(name)
            "#,
        )
        .bind(account_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, created_at)| Tag::new(id, name, created_at))
            .collect())
    }

    async fn find_by_name(&self, account_id: &str, name: &str) -> Result<Option<Tag>, AppError> {
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT id, name, created_at
            FROM tags
            WHERE account_id = $1 AND LOWER(name) = LOWER($2)
            "#,
        )
        .bind(account_id)
        .bind(name.trim())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|(id, name, created_at)| Tag::new(id, name, created_at)))
    }

    async fn create(&self, tag: NewTag) -> Result<Tag, AppError> {
        let (id, name, created_at) = sqlx::query_as::<_, TagRow>(
            r#"
            INSERT INTO tags (account_id, user_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(&tag.account_id)
        .bind(&tag.user_id)
        .bind(tag.name.trim())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Tag::new(id, name, created_at))
    }
}
