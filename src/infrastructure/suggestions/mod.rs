//! Suggestion provider implementations.
//!
//! - [`HttpSuggestionProvider`] - Calls the external suggestion service
//! - [`NullSuggestionProvider`] - Offers nothing; used when no service is configured

mod http_suggestion_provider;
mod null_suggestion_provider;

pub use http_suggestion_provider::{HttpSuggestionProvider, SuggestionError};
pub use null_suggestion_provider::NullSuggestionProvider;
