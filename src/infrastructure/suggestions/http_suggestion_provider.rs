//! HTTP client for the external suggestion service.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use url::Url;

use crate::domain::entities::TermSuggestion;
use crate::domain::repositories::SuggestionProvider;

/// Attempts after the first one for idempotent GETs.
const RETRY_ATTEMPTS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error("invalid suggestion service URL: {0}")]
    InvalidBaseUrl(String),
    #[error("suggestion service request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("suggestion service returned status {0}")]
    Status(u16),
}

/// Fetches content and term suggestions over HTTP.
///
/// Failed requests are retried briefly with jittered backoff, then logged and
/// reported as "no suggestions". Errors never reach the conversation.
///
/// # Endpoints
///
/// - `GET {base}/content-suggestions/{source}/{medium}` returning `string[]`
/// - `GET {base}/term-suggestions?category=` returning
///   `{termValue, description?, category}[]`
pub struct HttpSuggestionProvider {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSuggestionProvider {
    /// # Errors
    ///
    /// Returns [`SuggestionError::InvalidBaseUrl`] if `base_url` cannot carry
    /// path segments, or [`SuggestionError::Network`] if the client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SuggestionError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| SuggestionError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(SuggestionError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SuggestionError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SuggestionError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SuggestionError> {
        let strategy = ExponentialBackoff::from_millis(10)
            .factor(10)
            .max_delay(Duration::from_millis(500))
            .map(jitter)
            .take(RETRY_ATTEMPTS);

        Retry::spawn(strategy, || {
            let request = self.client.get(url.clone());
            async move {
                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(SuggestionError::Status(status.as_u16()));
                }
                Ok(response.json::<T>().await?)
            }
        })
        .await
    }
}

#[async_trait]
impl SuggestionProvider for HttpSuggestionProvider {
    async fn fetch_content_suggestions(&self, source: &str, medium: &str) -> Vec<String> {
        let result = match self.endpoint(&["content-suggestions", source, medium]) {
            Ok(url) => self.get_json::<Vec<String>>(url).await,
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, source, medium, "Content suggestions unavailable");
            Vec::new()
        })
    }

    async fn fetch_term_suggestions(&self, category: Option<String>) -> Vec<TermSuggestion> {
        let result = match self.endpoint(&["term-suggestions"]) {
            Ok(mut url) => {
                if let Some(category) = category.as_deref() {
                    url.query_pairs_mut().append_pair("category", category);
                }
                self.get_json::<Vec<TermSuggestion>>(url).await
            }
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, ?category, "Term suggestions unavailable");
            Vec::new()
        })
    }

    async fn is_available(&self) -> bool {
        let Ok(url) = self.endpoint(&["term-suggestions"]) else {
            return false;
        };
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Suggestion service health probe failed");
                false
            }
        }
    }
}
