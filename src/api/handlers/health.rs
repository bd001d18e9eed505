//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Database reachable (or in-memory backend)
/// - **503 Service Unavailable**: Database check failed
///
/// An unreachable suggestion service is reported but does not degrade the
/// service: the conversation falls back to custom entry.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "suggestions": { "status": "unavailable", "message": "Suggestion service unreachable" },
///     "sessions": { "status": "ok", "message": "Active: 3" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let suggestions = check_suggestions(&state).await;
    let sessions = check_sessions(&state).await;

    let healthy = database.is_ok();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            suggestions,
            sessions,
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    let Some(pool) = &state.db else {
        return CheckStatus::ok("In-memory backend");
    };

    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool.as_ref())
        .await
    {
        Ok(_) => CheckStatus::ok("Connected"),
        Err(e) => CheckStatus::error(format!("Database error: {}", e)),
    }
}

async fn check_suggestions(state: &AppState) -> CheckStatus {
    if state.suggestions.is_available().await {
        CheckStatus::ok("Suggestion service reachable")
    } else {
        CheckStatus::unavailable("Suggestion service unreachable or not configured")
    }
}

async fn check_sessions(state: &AppState) -> CheckStatus {
    let active = state.conversation_service.store().len().await;
    CheckStatus::ok(format!("Active: {}", active))
}
