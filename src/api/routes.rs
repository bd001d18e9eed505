//! API route configuration.

use crate::api::handlers::{
    apply_action_handler, create_session_handler, delete_session_handler, get_session_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Conversation routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /sessions`              - Start a conversation
/// - `GET    /sessions/{id}`         - Current session view
/// - `DELETE /sessions/{id}`         - Discard a session
/// - `POST   /sessions/{id}/actions` - Apply a user action
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/sessions/{id}/actions", post(apply_action_handler))
}
