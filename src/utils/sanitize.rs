//! Tracking-parameter sanitization and field validation.
//!
//! Every value that ends up in a `utm_*` query parameter passes through
//! [`sanitize_parameter`]. Raw user text is checked with [`validate_field`]
//! first so the user gets a corrective prompt instead of a silently mangled value.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Characters accepted in raw field input: letters, digits, spaces, hyphens, underscores.
static FIELD_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 _-]*$").expect("valid field charset regex"));

static WHITESPACE_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static DISALLOWED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]").expect("valid disallowed-char regex"));

static HYPHEN_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("valid hyphen regex"));

/// The tracking fields a user can type a value for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Source,
    Medium,
    Campaign,
    Content,
    Term,
    /// Organizational tag name. Validated but never sanitized.
    Tag,
}

impl FieldKind {
    /// Maximum accepted length in characters.
    pub fn max_len(self) -> usize {
        match self {
            FieldKind::Medium | FieldKind::Tag => 50,
            FieldKind::Source | FieldKind::Campaign | FieldKind::Content | FieldKind::Term => 100,
        }
    }

    /// Content and term may be left empty; the other fields are mandatory.
    pub fn is_optional(self) -> bool {
        matches!(self, FieldKind::Content | FieldKind::Term)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Source => "source",
            FieldKind::Medium => "medium",
            FieldKind::Campaign => "campaign",
            FieldKind::Content => "content",
            FieldKind::Term => "term",
            FieldKind::Tag => "tag",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a raw field value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(FieldKind),

    #[error("{kind} must be at most {max} characters (got {actual})")]
    TooLong {
        kind: FieldKind,
        max: usize,
        actual: usize,
    },

    #[error("{0} can only contain letters, numbers, spaces, hyphens and underscores")]
    InvalidCharacters(FieldKind),
}

/// Normalizes raw text into a safe tracking-parameter value.
///
/// Lower-cases, trims, turns whitespace runs into single hyphens, drops every
/// character outside `[a-z0-9-_]`, collapses repeated hyphens and trims
/// leading/trailing hyphens. The output is a fixed point:
/// `sanitize_parameter(&sanitize_parameter(x)) == sanitize_parameter(x)`.
///
/// # Examples
///
/// ```
/// use campaign_builder::utils::sanitize::sanitize_parameter;
///
/// assert_eq!(sanitize_parameter("Summer Sale!! 2025"), "summer-sale-2025");
/// assert_eq!(sanitize_parameter("  Paid   Social "), "paid-social");
/// ```
pub fn sanitize_parameter(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let hyphenated = WHITESPACE_RUN_REGEX.replace_all(lowered.trim(), "-");
    let stripped = DISALLOWED_REGEX.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUN_REGEX.replace_all(&stripped, "-");

    collapsed.trim_matches('-').to_string()
}

/// Validates raw user input for a tracking field before sanitization.
///
/// # Errors
///
/// - [`FieldError::Required`] if a mandatory field is blank
/// - [`FieldError::TooLong`] if the trimmed value exceeds [`FieldKind::max_len`]
/// - [`FieldError::InvalidCharacters`] for anything besides letters, digits,
///   spaces, hyphens and underscores
pub fn validate_field(kind: FieldKind, value: &str) -> Result<(), FieldError> {
    let value = value.trim();

    if value.is_empty() {
        return if kind.is_optional() {
            Ok(())
        } else {
            Err(FieldError::Required(kind))
        };
    }

    let actual = value.chars().count();
    if actual > kind.max_len() {
        return Err(FieldError::TooLong {
            kind,
            max: kind.max_len(),
            actual,
        });
    }

    if !FIELD_CHARSET_REGEX.is_match(value) {
        return Err(FieldError::InvalidCharacters(kind));
    }

    Ok(())
}

/// Validates and sanitizes in one step, rejecting values that sanitize to nothing.
///
/// Used at intake for mandatory fields so the draft only ever stores clean values.
pub fn clean_field(kind: FieldKind, value: &str) -> Result<String, FieldError> {
    validate_field(kind, value)?;

    let sanitized = sanitize_parameter(value);
    if sanitized.is_empty() && !kind.is_optional() {
        return Err(FieldError::Required(kind));
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_campaign_name() {
        assert_eq!(sanitize_parameter("Summer Sale!! 2025"), "summer-sale-2025");
    }

    #[test]
    fn test_sanitize_collapses_whitespace_and_hyphens() {
        assert_eq!(sanitize_parameter("a  -  b"), "a-b");
        assert_eq!(sanitize_parameter("--black---friday--"), "black-friday");
    }

    #[test]
    fn test_sanitize_keeps_underscores() {
        assert_eq!(sanitize_parameter("Spring_Promo"), "spring_promo");
    }

    #[test]
    fn test_sanitize_tabs_and_newlines() {
        assert_eq!(sanitize_parameter("\tnew\nyear "), "new-year");
    }

    #[test]
    fn test_sanitize_only_symbols() {
        assert_eq!(sanitize_parameter("!!!"), "");
        assert_eq!(sanitize_parameter(""), "");
    }

    #[test]
    fn test_sanitize_drops_non_ascii() {
        assert_eq!(sanitize_parameter("Café Crème"), "caf-crme");
    }

    #[test]
    fn test_validate_tag() {
        assert!(validate_field(FieldKind::Tag, "Q3 Launch").is_ok());
        assert_eq!(
            validate_field(FieldKind::Tag, "  "),
            Err(FieldError::Required(FieldKind::Tag))
        );
        assert!(matches!(
            validate_field(FieldKind::Tag, &"t".repeat(51)),
            Err(FieldError::TooLong { max: 50, .. })
        ));
    }

    #[test]
    fn test_validate_source_ok() {
        assert!(validate_field(FieldKind::Source, "Google Ads").is_ok());
        assert!(validate_field(FieldKind::Source, "my_source-1").is_ok());
    }

    #[test]
    fn test_validate_required_fields() {
        assert_eq!(
            validate_field(FieldKind::Campaign, "   "),
            Err(FieldError::Required(FieldKind::Campaign))
        );
        assert_eq!(
            validate_field(FieldKind::Source, ""),
            Err(FieldError::Required(FieldKind::Source))
        );
    }

    #[test]
    fn test_validate_optional_fields_accept_empty() {
        assert!(validate_field(FieldKind::Content, "").is_ok());
        assert!(validate_field(FieldKind::Term, "  ").is_ok());
    }

    #[test]
    fn test_validate_length_limits() {
        let medium = "m".repeat(51);
        assert!(matches!(
            validate_field(FieldKind::Medium, &medium),
            Err(FieldError::TooLong { max: 50, actual: 51, .. })
        ));
        assert!(validate_field(FieldKind::Medium, &"m".repeat(50)).is_ok());

        let source = "s".repeat(101);
        assert!(validate_field(FieldKind::Source, &source).is_err());
        assert!(validate_field(FieldKind::Term, &"t".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_rejects_symbols() {
        assert_eq!(
            validate_field(FieldKind::Campaign, "Summer Sale!!"),
            Err(FieldError::InvalidCharacters(FieldKind::Campaign))
        );
        assert!(validate_field(FieldKind::Content, "<script>").is_err());
    }

    #[test]
    fn test_clean_field() {
        assert_eq!(
            clean_field(FieldKind::Medium, "Paid Social").unwrap(),
            "paid-social"
        );
        assert_eq!(
            clean_field(FieldKind::Source, "- -"),
            Err(FieldError::Required(FieldKind::Source))
        );
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(raw in "\\PC{0,64}") {
            let once = sanitize_parameter(&raw);
            prop_assert_eq!(sanitize_parameter(&once), once.clone());
        }

        #[test]
        fn prop_sanitize_output_charset(raw in "\\PC{0,64}") {
            let out = sanitize_parameter(&raw);
            prop_assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'));
            prop_assert!(!out.starts_with('-') && !out.ends_with('-'));
            prop_assert!(!out.contains("--"));
        }

        #[test]
        fn prop_sanitize_case_insensitive(raw in "[A-Za-z0-9 _-]{0,40}") {
            prop_assert_eq!(sanitize_parameter(&raw.to_uppercase()), sanitize_parameter(&raw));
        }
    }
}
