//! Boundary to the external suggestion service.

use crate::domain::entities::TermSuggestion;
use async_trait::async_trait;

/// Source of content and term suggestions.
///
/// Both calls are infallible from the caller's point of view: implementations
/// log failures and return an empty list, which the conversation treats as
/// "no suggestions, type your own".
///
/// # Implementations
///
/// - [`crate::infrastructure::suggestions::HttpSuggestionProvider`] - remote service over HTTP
/// - [`crate::infrastructure::suggestions::NullSuggestionProvider`] - always empty
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Content values previously used or curated for a source and medium.
    async fn fetch_content_suggestions(&self, source: &str, medium: &str) -> Vec<String>;

    /// Term suggestions, optionally narrowed to a category.
    async fn fetch_term_suggestions(&self, category: Option<String>) -> Vec<TermSuggestion>;

    /// Whether the provider is reachable, for health reporting.
    async fn is_available(&self) -> bool;
}
