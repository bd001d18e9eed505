//! Repository trait for generated tracking links.

use crate::domain::entities::{NewTrackingLink, TrackingLinkRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for tracking links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTrackingLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_tracking_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackingLinkRepository: Send + Sync {
    /// Stores a tracking link.
    ///
    /// Idempotent on the exact (account, full tracking URL) pair so that a
    /// retried commit batch does not duplicate rows; a repeat returns the
    /// existing record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, link: NewTrackingLink) -> Result<TrackingLinkRecord, AppError>;
}
