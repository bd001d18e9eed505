//! Repository trait for organizational tags.

use crate::domain::entities::{NewTag, Tag};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for account tags.
///
/// Tag names are unique per account, compared case-insensitively.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTagRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_tag.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Lists the account's tags ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, account_id: &str) -> Result<Vec<Tag>, AppError>;

    /// Finds a tag by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_name(&self, account_id: &str, name: &str) -> Result<Option<Tag>, AppError>;

    /// Creates a tag.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a tag with the same name (ignoring
    /// case) already exists for the account.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, tag: NewTag) -> Result<Tag, AppError>;
}
