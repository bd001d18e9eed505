//! PostgreSQL implementation of the campaign repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::CampaignRepository;
use crate::error::AppError;

/// Reads campaign names from the `campaigns` table.
///
/// Rows are written by [`super::PgTrackingLinkRepository`] whenever a link is
/// stored, so `last_used_at` tracks the latest commit for a name.
pub struct PgCampaignRepository {
    pool: Arc<PgPool>,
}

impl PgCampaignRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn recent_campaign_names(
        &self,
        account_id: &str,
        limit: usize,
    ) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM campaigns
            WHERE account_id = $1 AND archived = FALSE
            ORDER BY last_used_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(account_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(names)
    }
}
