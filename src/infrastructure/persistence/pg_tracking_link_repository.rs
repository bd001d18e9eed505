//! PostgreSQL implementation of the tracking link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewTrackingLink, TrackingLinkRecord};
use crate::domain::repositories::TrackingLinkRepository;
use crate::error::AppError;

type TrackingLinkRow = (i64, String, String, DateTime<Utc>);

/// PostgreSQL repository for generated tracking links.
///
/// Each insert also upserts the campaign name into `campaigns`, which feeds
/// the recent-campaign suggestions.
pub struct PgTrackingLinkRepository {
    pool: Arc<PgPool>,
}

impl PgTrackingLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackingLinkRepository for PgTrackingLinkRepository {
    async fn create(&self, link: NewTrackingLink) -> Result<TrackingLinkRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO campaigns (account_id, name)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT campaigns_account_name_key
            DO UPDATE SET last_used_at = NOW()
            "#,
        )
        .bind(&link.account_id)
        .bind(&link.campaign)
        .execute(&mut *tx)
        .await?;

        let (id, full_tracking_url, campaign, created_at) =
            sqlx::query_as::<_, TrackingLinkRow>(
                r#"
                INSERT INTO tracking_links
                    (account_id, user_id, target_url, campaign, source, medium,
                     content, term, tags, full_tracking_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT ON CONSTRAINT tracking_links_account_url_key
                DO UPDATE SET full_tracking_url = EXCLUDED.full_tracking_url
                RETURNING id, full_tracking_url, campaign, created_at
                "#,
            )
            .bind(&link.account_id)
            .bind(&link.user_id)
            .bind(&link.target_url)
            .bind(&link.campaign)
            .bind(&link.source)
            .bind(&link.medium)
            .bind(&link.content)
            .bind(&link.term)
            .bind(&link.tags)
            .bind(&link.full_tracking_url)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(TrackingLinkRecord {
            id,
            full_tracking_url,
            campaign,
            created_at,
        })
    }
}
