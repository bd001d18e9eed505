//! Suggestion values offered to speed up a step.
//!
//! Suggestions are never authoritative: an empty list simply means the user
//! types a custom value.

use serde::{Deserialize, Serialize};

/// A term suggestion as returned by the suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSuggestion {
    #[serde(rename = "termValue", alias = "term_value", alias = "value")]
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A suggestion ready to be rendered as an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Value sent back when picked.
    pub value: String,
    /// Display text.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Suggestion {
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            description: None,
        }
    }
}

/// Ranks URLs by number of occurrences, most used first.
///
/// Ties keep first-appearance order. At most `limit` distinct URLs are returned.
pub fn rank_most_used(urls: &[String], limit: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for url in urls {
        match counts.iter_mut().find(|(seen, _)| seen == url) {
            Some((_, count)) => *count += 1,
            None => counts.push((url.clone(), 1)),
        }
    }

    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(url, _)| url).collect()
}
