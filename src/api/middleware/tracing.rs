//! HTTP request/response tracing middleware.

use axum::http::Request;
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};
use uuid::Uuid;

/// Opens one span per request, tagged with the conversation it addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSpan;

impl<B> MakeSpan<B> for SessionSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            session_id = session_id_from_path(request.uri().path()),
        )
    }
}

/// Extracts the session id from `/api/sessions/{id}[/...]`.
pub fn session_id_from_path(path: &str) -> Option<&str> {
    let mut segments = path.split('/').skip_while(|s| *s != "sessions").skip(1);
    segments
        .next()
        .filter(|id| Uuid::parse_str(id).is_ok())
}

/// Creates a tracing middleware for HTTP requests.
///
/// Spans carry the method, URI and, for session routes, the session id, so
/// every event logged while applying an action is attributable to its
/// conversation. Responses are logged at `INFO` with status and latency in
/// milliseconds; server errors additionally at `ERROR`.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=POST uri=/api/sessions/4f1c.../actions session_id=4f1c...}: finished processing request latency=3 ms status=200
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, SessionSpan> {
    TraceLayer::new_for_http()
        .make_span_with(SessionSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Millis))
}
