//! Handlers for the conversation endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::session::{ActionRequest, CreateSessionRequest, SessionView};
use crate::domain::conversation::{Owner, UserAction};
use crate::error::AppError;
use crate::state::AppState;

/// Starts a conversation and returns its welcome prompt.
///
/// # Endpoint
///
/// `POST /api/sessions`
///
/// # Request Body
///
/// ```json
/// { "user_id": "user-1", "account_id": "acct-1" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is malformed or an id is blank.
pub async fn create_session_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let owner: Owner = payload.into();
    if owner.user_id.is_empty() || owner.account_id.is_empty() {
        return Err(AppError::bad_request(
            "user_id and account_id must not be blank",
            json!({ "fields": ["user_id", "account_id"] }),
        ));
    }

    let snapshot = state.conversation_service.create_session(owner).await;

    Ok((StatusCode::CREATED, Json(snapshot.into())))
}

/// Returns the current view of a session.
///
/// # Endpoint
///
/// `GET /api/sessions/{id}`
///
/// # Errors
///
/// Returns 404 Not Found for unknown session ids.
pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let snapshot = state.conversation_service.get_session(id).await?;
    Ok(Json(snapshot.into()))
}

/// Applies one user action and returns the updated session.
///
/// # Endpoint
///
/// `POST /api/sessions/{id}/actions`
///
/// # Request Body
///
/// ```json
/// { "action": "select", "value": "google" }
/// ```
///
/// Gateway failures do not fail the request; they are reported through the
/// session's `recovery` field and prompt.
///
/// # Errors
///
/// Returns 400 Bad Request for malformed actions and 404 Not Found for
/// unknown session ids.
pub async fn apply_action_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let action = UserAction::try_from(payload)?;

    let snapshot = state.conversation_service.apply_action(id, action).await?;
    Ok(Json(snapshot.into()))
}

/// Discards a session.
///
/// # Endpoint
///
/// `DELETE /api/sessions/{id}`
///
/// # Errors
///
/// Returns 404 Not Found for unknown session ids.
pub async fn delete_session_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.conversation_service.delete_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
