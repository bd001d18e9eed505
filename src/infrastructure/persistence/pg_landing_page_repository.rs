//! PostgreSQL implementation of the landing page repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{LandingPageRecord, NewLandingPage};
use crate::domain::repositories::LandingPageRepository;
use crate::error::AppError;

type LandingPageRow = (i64, String, String, String, DateTime<Utc>);

pub struct PgLandingPageRepository {
    pool: Arc<PgPool>,
}

impl PgLandingPageRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LandingPageRepository for PgLandingPageRepository {
    async fn known_urls(&self, account_id: &str) -> Result<Vec<String>, AppError> {
        // Insertion order so that frequency ties rank by first appearance.
        let urls = sqlx::query_scalar::<_, String>(
            r#"
            SELECT url
            FROM landing_pages
            WHERE account_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(account_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(urls)
    }

    async fn create(&self, page: NewLandingPage) -> Result<LandingPageRecord, AppError> {
        // The no-op update makes RETURNING yield the existing row on a repeat.
        let (id, campaign_name, url, label, created_at) = sqlx::query_as::<_, LandingPageRow>(
            r#"
            INSERT INTO landing_pages (account_id, user_id, campaign_name, url, label)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT ON CONSTRAINT landing_pages_account_campaign_url_key
            DO UPDATE SET url = EXCLUDED.url
            RETURNING id, campaign_name, url, label, created_at
            "#,
        )
        .bind(&page.account_id)
        .bind(&page.user_id)
        .bind(&page.campaign_name)
        .bind(&page.url)
        .bind(&page.label)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LandingPageRecord {
            id,
            campaign_name,
            url,
            label,
            created_at,
        })
    }
}
