//! Repository trait for campaign lookups.

use crate::error::AppError;
use async_trait::async_trait;

/// Read access to the campaigns an account has already run.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCampaignRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Returns up to `limit` distinct campaign names, most recently used first.
    ///
    /// Archived campaigns are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn recent_campaign_names(
        &self,
        account_id: &str,
        limit: usize,
    ) -> Result<Vec<String>, AppError>;
}
