//! Flow settings and the built-in source/medium catalogue.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How the term step applies a picked term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermSelection {
    /// Terms toggle independently; several may be active.
    #[default]
    Multiple,
    /// Picking a term replaces the previous one.
    Single,
}

impl FromStr for TermSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiple" | "multi" => Ok(TermSelection::Multiple),
            "single" => Ok(TermSelection::Single),
            other => Err(format!("unknown term selection mode '{other}'")),
        }
    }
}

impl fmt::Display for TermSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSelection::Multiple => f.write_str("multiple"),
            TermSelection::Single => f.write_str("single"),
        }
    }
}

/// Per-deployment knobs of the conversation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    pub term_selection: TermSelection,
    /// Consecutive counted failures after which only fallback options are offered.
    pub fallback_threshold: u32,
    /// Non-conversational link creation page offered as fallback.
    pub manual_flow_url: String,
    pub landing_page_suggestions: usize,
    pub recent_campaigns: usize,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            term_selection: TermSelection::Multiple,
            fallback_threshold: 3,
            manual_flow_url: "/links/new".to_string(),
            landing_page_suggestions: 5,
            recent_campaigns: 10,
        }
    }
}

/// Traffic sources offered on the sources step.
pub const DEFAULT_SOURCES: &[&str] = &[
    "google",
    "facebook",
    "instagram",
    "linkedin",
    "twitter",
    "tiktok",
    "youtube",
    "newsletter",
    "email",
];

/// Mediums offered for sources outside the catalogue.
pub const FALLBACK_MEDIUMS: &[&str] = &["cpc", "social", "referral", "email", "display"];

/// Mediums offered for a given source.
pub fn mediums_for_source(source: &str) -> &'static [&'static str] {
    match source {
        "google" => &["cpc", "organic", "display", "video"],
        "facebook" | "instagram" => &["paid-social", "organic-social", "story"],
        "linkedin" => &["paid-social", "organic-social", "inmail"],
        "twitter" | "tiktok" => &["paid-social", "organic-social"],
        "youtube" => &["video", "paid-social"],
        "newsletter" | "email" => &["email"],
        _ => FALLBACK_MEDIUMS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_selection_parse() {
        assert_eq!("single".parse::<TermSelection>().unwrap(), TermSelection::Single);
        assert_eq!(" Multiple ".parse::<TermSelection>().unwrap(), TermSelection::Multiple);
        assert!("many".parse::<TermSelection>().is_err());
        assert_eq!(TermSelection::Single.to_string(), "single");
    }

    #[test]
    fn test_mediums_for_source() {
        assert_eq!(mediums_for_source("newsletter"), ["email"]);
        assert_eq!(mediums_for_source("my-podcast"), FALLBACK_MEDIUMS);
        assert!(mediums_for_source("google").contains(&"cpc"));
    }

    #[test]
    fn test_defaults() {
        let settings = FlowSettings::default();
        assert_eq!(settings.fallback_threshold, 3);
        assert_eq!(settings.term_selection, TermSelection::Multiple);
    }
}
