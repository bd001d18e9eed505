//! Repository trait for landing pages.

use crate::domain::entities::{LandingPageRecord, NewLandingPage};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for landing pages attached to campaigns.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLandingPageRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_landing_page.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LandingPageRepository: Send + Sync {
    /// Every landing-page URL the account has used, one entry per use.
    ///
    /// Repeated URLs are returned repeatedly so callers can rank by frequency.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn known_urls(&self, account_id: &str) -> Result<Vec<String>, AppError>;

    /// Stores a landing page under a campaign.
    ///
    /// Idempotent on (account, campaign, url): a repeated call returns the
    /// existing record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, page: NewLandingPage) -> Result<LandingPageRecord, AppError>;
}
