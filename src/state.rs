//! Shared application state injected into handlers.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::ConversationService;
use crate::domain::repositories::SuggestionProvider;

#[derive(Clone)]
pub struct AppState {
    pub conversation_service: Arc<ConversationService>,
    pub suggestions: Arc<dyn SuggestionProvider>,
    /// `None` when running on the in-memory backend.
    pub db: Option<Arc<PgPool>>,
}

impl AppState {
    pub fn new(
        conversation_service: Arc<ConversationService>,
        suggestions: Arc<dyn SuggestionProvider>,
        db: Option<Arc<PgPool>>,
    ) -> Self {
        Self {
            conversation_service,
            suggestions,
            db,
        }
    }
}
