mod common;

use axum::http::StatusCode;
use campaign_builder::domain::conversation::{FlowSettings, TermSelection};
use common::{
    ACCOUNT_ID, control, create_test_state, enter, make_server, option_actions, option_values,
    select, start_session, walk_to_review,
};
use serde_json::{Value, json};

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_session_emits_welcome() {
    let (state, _store) = create_test_state(FlowSettings::default());
    let server = make_server(state);

    let response = server
        .post("/api/sessions")
        .json(&json!({ "user_id": "user-1", "account_id": "acct-1" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let view = response.json::<Value>();
    assert_eq!(view["step"]["name"], "welcome");
    assert_eq!(view["account_id"], "acct-1");
    assert_eq!(view["combination_count"], 0);
    assert_eq!(view["transcript"].as_array().unwrap().len(), 1);
    assert_eq!(option_values(&view), ["start"]);
}

#[tokio::test]
async fn test_create_session_rejects_blank_owner() {
    let (state, _store) = create_test_state(FlowSettings::default());
    let server = make_server(state);

    let response = server
        .post("/api/sessions")
        .json(&json!({ "user_id": "", "account_id": "acct-1" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_unknown_session_returns_404() {
    let (state, _store) = create_test_state(FlowSettings::default());
    let server = make_server(state);
    let id = uuid::Uuid::new_v4();

    let response = server.get(&format!("/api/sessions/{id}")).await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");

    let response = server
        .post(&format!("/api/sessions/{id}/actions"))
        .json(&json!({ "action": "continue" }))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_malformed_actions_return_400() {
    let (state, _store) = create_test_state(FlowSettings::default());
    let server = make_server(state);
    let id = start_session(&server).await;
    let path = format!("/api/sessions/{id}/actions");

    let unknown = server.post(&path).json(&json!({ "action": "jump" })).await;
    unknown.assert_status_bad_request();
    assert_eq!(unknown.json::<Value>()["error"]["code"], "validation_error");

    let missing_value = server.post(&path).json(&json!({ "action": "select" })).await;
    missing_value.assert_status_bad_request();

    // Rejected requests never reach the transcript.
    let view = server.get(&format!("/api/sessions/{id}")).await.json::<Value>();
    assert_eq!(view["transcript"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_session() {
    let (state, _store) = create_test_state(FlowSettings::default());
    let server = make_server(state);
    let id = start_session(&server).await;

    server
        .delete(&format!("/api/sessions/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/sessions/{id}"))
        .await
        .assert_status_not_found();
    server
        .delete(&format!("/api/sessions/{id}"))
        .await
        .assert_status_not_found();
}

// ─── Flow ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_flow_creates_links() {
    let (state, store) = create_test_state(FlowSettings::default());
    let server = make_server(state);
    let id = start_session(&server).await;

    let review = walk_to_review(&server, &id).await;
    assert_eq!(review["step"]["name"], "review");
    assert_eq!(review["combination_count"], 3);
    assert!(
        review["prompt"]["text"]
            .as_str()
            .unwrap()
            .contains("This will create 3 tracking link(s).")
    );

    let done = control(&server, &id, "commit").await;
    assert_eq!(done["step"]["name"], "complete");
    assert!(done["recovery"].is_null());

    let urls: Vec<&str> = done["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["full_tracking_url"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        [
            "https://shop.example.com/sale?ref=home&utm_source=google&utm_medium=cpc&utm_campaign=summer-sale&utm_content=hero",
            "https://shop.example.com/sale?ref=home&utm_source=google&utm_medium=cpc&utm_campaign=summer-sale&utm_content=sidebar",
            "https://shop.example.com/sale?ref=home&utm_source=facebook&utm_medium=paid-social&utm_campaign=summer-sale",
        ]
    );
    assert_eq!(option_actions(&done), ["restart"]);

    assert_eq!(store.tracking_link_count(ACCOUNT_ID).await, 3);
    assert_eq!(store.landing_page_count(ACCOUNT_ID).await, 1);
}

#[tokio::test]
async fn test_committed_campaign_is_offered_next_time() {
    let (state, _store) = create_test_state(FlowSettings::default());
    let server = make_server(state);

    let first = start_session(&server).await;
    walk_to_review(&server, &first).await;
    control(&server, &first, "commit").await;

    let second = start_session(&server).await;
    select(&server, &second, "start").await;
    let view = select(&server, &second, "existing").await;

    assert_eq!(view["step"]["name"], "existing-campaign");
    assert!(option_values(&view).contains(&"summer-sale".to_string()));

    let view = enter(&server, &second, "summer-sale").await;
    assert_eq!(view["step"]["name"], "landing-pages");
    // The landing page used before is suggested.
    assert!(
        option_values(&view).contains(&"https://shop.example.com/sale?ref=home".to_string())
    );
}

#[tokio::test]
async fn test_back_keeps_selections() {
    let (state, _store) = create_test_state(FlowSettings::default());
    let server = make_server(state);
    let id = start_session(&server).await;

    select(&server, &id, "start").await;
    select(&server, &id, "new").await;
    enter(&server, &id, "spring").await;
    enter(&server, &id, "https://a.example.com/").await;
    control(&server, &id, "continue").await;
    select(&server, &id, "google").await;
    control(&server, &id, "continue").await;

    let view = control(&server, &id, "back").await;
    assert_eq!(view["step"]["name"], "sources");

    let chosen: Vec<&str> = view["prompt"]["options"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|o| o["state"] == "chosen")
        .filter_map(|o| o["value"].as_str())
        .collect();
    assert_eq!(chosen, ["google"]);
}

#[tokio::test]
async fn test_invalid_landing_page_is_reprompted() {
    let (state, _store) = create_test_state(FlowSettings::default());
    let server = make_server(state);
    let id = start_session(&server).await;

    select(&server, &id, "start").await;
    select(&server, &id, "new").await;
    enter(&server, &id, "spring").await;
    let view = enter(&server, &id, "ftp://files.example.com").await;

    assert_eq!(view["step"]["name"], "landing-pages");
    assert!(view["draft"]["landing_pages"].as_array().unwrap().is_empty());
    assert!(view["recovery"].is_null());
}

#[tokio::test]
async fn test_single_term_selection_replaces() {
    let settings = FlowSettings {
        term_selection: TermSelection::Single,
        ..FlowSettings::default()
    };
    let (state, _store) = create_test_state(settings);
    let server = make_server(state);
    let id = start_session(&server).await;

    select(&server, &id, "start").await;
    select(&server, &id, "new").await;
    enter(&server, &id, "spring").await;
    enter(&server, &id, "https://a.example.com/").await;
    control(&server, &id, "continue").await;
    select(&server, &id, "google").await;
    control(&server, &id, "continue").await;
    select(&server, &id, "cpc").await;
    control(&server, &id, "continue").await;
    control(&server, &id, "skip").await;

    enter(&server, &id, "shoes").await;
    let view = enter(&server, &id, "boots").await;

    assert_eq!(view["step"]["name"], "terms");
    assert_eq!(view["draft"]["selected_term"]["google|cpc"], json!(["boots"]));
}

#[tokio::test]
async fn test_typed_tag_is_created_once() {
    let (state, _store) = create_test_state(FlowSettings::default());
    let server = make_server(state);

    let first = start_session(&server).await;
    walk_to_review(&server, &first).await;
    control(&server, &first, "back").await;
    let view = enter(&server, &first, "Q3 Launch").await;
    assert_eq!(view["step"]["name"], "tags");
    assert_eq!(view["draft"]["selected_tags"], json!(["Q3 Launch"]));

    // A second session typing the same tag in another case reuses it.
    let second = start_session(&server).await;
    walk_to_review(&server, &second).await;
    let view = control(&server, &second, "back").await;
    assert!(option_values(&view).contains(&"Q3 Launch".to_string()));

    let view = enter(&server, &second, "q3 launch").await;
    assert_eq!(view["draft"]["selected_tags"], json!(["Q3 Launch"]));
    assert!(view["recovery"].is_null());
}

// ─── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_repeated_commit_failures_fall_back_to_manual_flow() {
    let (state, store) = create_test_state(FlowSettings::default());
    let server = make_server(state);
    let id = start_session(&server).await;
    walk_to_review(&server, &id).await;

    store.fail_next_writes(3);

    let view = control(&server, &id, "commit").await;
    assert_eq!(view["step"]["name"], "review");
    assert_eq!(view["recovery"], "retry");
    assert_eq!(view["consecutive_errors"], 1);
    assert!(option_actions(&view).contains(&"retry".to_string()));

    let view = control(&server, &id, "retry").await;
    assert_eq!(view["recovery"], "retry");

    let view = control(&server, &id, "retry").await;
    assert_eq!(view["recovery"], "fallback");
    assert_eq!(view["consecutive_errors"], 3);
    let options = view["prompt"]["options"].as_array().unwrap();
    assert!(options.iter().any(|o| o["href"] == "/links/new"));
    assert!(!option_actions(&view).contains(&"retry".to_string()));

    // A fourth retry is refused without touching storage.
    let view = control(&server, &id, "retry").await;
    assert_eq!(view["recovery"], "fallback");
    assert_eq!(store.tracking_link_count(ACCOUNT_ID).await, 0);

    let view = control(&server, &id, "restart").await;
    assert_eq!(view["step"]["name"], "welcome");
    assert!(view["recovery"].is_null());
    assert_eq!(view["consecutive_errors"], 0);
}

#[tokio::test]
async fn test_overlong_links_abort_commit_without_writes() {
    let (state, store) = create_test_state(FlowSettings::default());
    let server = make_server(state);
    let id = start_session(&server).await;

    // Each part is within its own limit; together they pass the URL ceiling.
    let landing_page = format!("https://shop.example.com/{}", "p".repeat(1760));
    let long_value = "x".repeat(100);

    select(&server, &id, "start").await;
    select(&server, &id, "new").await;
    enter(&server, &id, &"c".repeat(100)).await;
    enter(&server, &id, &landing_page).await;
    control(&server, &id, "continue").await;
    select(&server, &id, "google").await;
    control(&server, &id, "continue").await;
    select(&server, &id, "cpc").await;
    control(&server, &id, "continue").await;
    enter(&server, &id, &long_value).await;
    control(&server, &id, "continue").await;
    enter(&server, &id, &long_value).await;
    control(&server, &id, "continue").await;
    let view = control(&server, &id, "skip").await;
    assert_eq!(view["step"]["name"], "review");
    assert_eq!(view["combination_count"], 1);

    let view = control(&server, &id, "commit").await;
    assert_eq!(view["step"]["name"], "review");
    assert_eq!(view["recovery"], "restart");
    assert_eq!(view["consecutive_errors"], 0);
    assert!(view["links"].as_array().unwrap().is_empty());
    assert_eq!(option_actions(&view), ["restart"]);
    assert_eq!(store.landing_page_count(ACCOUNT_ID).await, 0);
    assert_eq!(store.tracking_link_count(ACCOUNT_ID).await, 0);

    // Retrying cannot help, so it is not offered and does nothing.
    let view = control(&server, &id, "retry").await;
    assert_eq!(view["recovery"], "restart");
    assert_eq!(store.tracking_link_count(ACCOUNT_ID).await, 0);

    let view = control(&server, &id, "restart").await;
    assert_eq!(view["step"]["name"], "welcome");
    assert!(view["recovery"].is_null());
}

#[tokio::test]
async fn test_retry_after_single_failure_completes() {
    let (state, store) = create_test_state(FlowSettings::default());
    let server = make_server(state);
    let id = start_session(&server).await;
    walk_to_review(&server, &id).await;

    store.fail_next_writes(1);
    let view = control(&server, &id, "commit").await;
    assert_eq!(view["recovery"], "retry");

    let view = control(&server, &id, "retry").await;
    assert_eq!(view["step"]["name"], "complete");
    assert_eq!(view["consecutive_errors"], 0);
    assert_eq!(store.tracking_link_count(ACCOUNT_ID).await, 3);
}

#[tokio::test]
async fn test_fallback_threshold_is_configurable() {
    let settings = FlowSettings {
        fallback_threshold: 1,
        manual_flow_url: "/manual".to_string(),
        ..FlowSettings::default()
    };
    let (state, store) = create_test_state(settings);
    let server = make_server(state);
    let id = start_session(&server).await;
    walk_to_review(&server, &id).await;

    store.fail_next_writes(1);
    let view = control(&server, &id, "commit").await;

    assert_eq!(view["recovery"], "fallback");
    let options = view["prompt"]["options"].as_array().unwrap();
    assert!(options.iter().any(|o| o["href"] == "/manual"));
}
