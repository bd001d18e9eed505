#![allow(dead_code)]

use axum::{Router, routing::get};
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;

use campaign_builder::api::handlers::health_handler;
use campaign_builder::api::routes::session_routes;
use campaign_builder::application::services::ConversationService;
use campaign_builder::application::session_store::SessionStore;
use campaign_builder::domain::conversation::FlowSettings;
use campaign_builder::infrastructure::memory::InMemoryStore;
use campaign_builder::infrastructure::suggestions::NullSuggestionProvider;
use campaign_builder::server::memory_gateway;
use campaign_builder::state::AppState;

pub const USER_ID: &str = "user-1";
pub const ACCOUNT_ID: &str = "acct-1";

pub fn create_test_state(settings: FlowSettings) -> (AppState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let suggestions = Arc::new(NullSuggestionProvider::new());

    let conversation_service = Arc::new(ConversationService::new(
        Arc::new(SessionStore::new()),
        memory_gateway(store.clone()),
        suggestions.clone(),
        settings,
    ));

    (AppState::new(conversation_service, suggestions, None), store)
}

/// Conversation and health routes without rate limiting.
pub fn make_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", session_routes())
        .with_state(state);
    TestServer::new(app).unwrap()
}

pub async fn start_session(server: &TestServer) -> String {
    let response = server
        .post("/api/sessions")
        .json(&json!({ "user_id": USER_ID, "account_id": ACCOUNT_ID }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

pub async fn act(server: &TestServer, id: &str, body: Value) -> Value {
    let response = server
        .post(&format!("/api/sessions/{id}/actions"))
        .json(&body)
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

pub async fn select(server: &TestServer, id: &str, value: &str) -> Value {
    act(server, id, json!({ "action": "select", "value": value })).await
}

pub async fn enter(server: &TestServer, id: &str, value: &str) -> Value {
    act(server, id, json!({ "action": "enter", "value": value })).await
}

pub async fn control(server: &TestServer, id: &str, action: &str) -> Value {
    act(server, id, json!({ "action": action })).await
}

/// Walks a new session to review: one landing page, google/cpc with two
/// content values and facebook/paid-social without any.
pub async fn walk_to_review(server: &TestServer, id: &str) -> Value {
    select(server, id, "start").await;
    select(server, id, "new").await;
    enter(server, id, "Summer Sale").await;
    enter(server, id, "https://shop.example.com/sale?ref=home").await;
    control(server, id, "continue").await;
    select(server, id, "google").await;
    select(server, id, "facebook").await;
    control(server, id, "continue").await;
    select(server, id, "cpc").await;
    control(server, id, "continue").await;
    select(server, id, "paid-social").await;
    control(server, id, "continue").await;
    enter(server, id, "hero").await;
    enter(server, id, "sidebar").await;
    control(server, id, "continue").await;
    control(server, id, "skip").await;
    control(server, id, "skip").await;
    control(server, id, "skip").await
}

pub fn option_values(view: &Value) -> Vec<String> {
    view["prompt"]["options"]
        .as_array()
        .map(|options| {
            options
                .iter()
                .filter_map(|o| o["value"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn option_actions(view: &Value) -> Vec<String> {
    view["prompt"]["options"]
        .as_array()
        .map(|options| {
            options
                .iter()
                .filter_map(|o| o["action"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
