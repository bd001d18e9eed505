//! No-op suggestion provider.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::entities::TermSuggestion;
use crate::domain::repositories::SuggestionProvider;

/// A provider that never has suggestions.
///
/// Content and term steps then fall back to custom entry only.
pub struct NullSuggestionProvider;

impl NullSuggestionProvider {
    pub fn new() -> Self {
        debug!("Using NullSuggestionProvider (suggestions disabled)");
        Self
    }
}

impl Default for NullSuggestionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SuggestionProvider for NullSuggestionProvider {
    async fn fetch_content_suggestions(&self, _source: &str, _medium: &str) -> Vec<String> {
        Vec::new()
    }

    async fn fetch_term_suggestions(&self, _category: Option<String>) -> Vec<TermSuggestion> {
        Vec::new()
    }

    async fn is_available(&self) -> bool {
        false
    }
}
