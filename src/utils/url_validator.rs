//! Landing-page URL validation and tracking-parameter stripping.
//!
//! A landing page is accepted only as an absolute `http`/`https` URL. Any
//! `utm_*` parameters it already carries are removed so that generated links
//! never end up with two competing attributions.

use url::Url;

/// Maximum length of a cleaned landing-page URL, before tracking parameters are added.
pub const MAX_LANDING_URL_LEN: usize = 1800;

/// Query parameters owned by the link generator.
pub const TRACKING_PARAMS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
];

/// Errors that can occur during URL validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL must start with http:// or https://")]
    UnsupportedProtocol,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL is too long ({actual} characters, maximum {max})")]
    TooLong { actual: usize, max: usize },
}

/// Validates a landing-page URL and returns its clean form.
///
/// # Rules
///
/// 1. **Protocol**: the trimmed input must begin with `http://` or `https://`
/// 2. **Syntax**: must parse as an absolute URL with a host
/// 3. **Hostname**: lower-cased, default ports removed
/// 4. **Tracking parameters**: every `utm_source`, `utm_medium`, `utm_campaign`,
///    `utm_content` and `utm_term` pair is removed, wherever it appears and
///    however often; other parameters keep their order and encoding
/// 5. **Length**: the cleaned URL must not exceed [`MAX_LANDING_URL_LEN`]
///
/// # Errors
///
/// See [`UrlValidationError`] for the individual failure cases.
///
/// # Examples
///
/// ```
/// use campaign_builder::utils::url_validator::validate_url;
///
/// assert_eq!(
///     validate_url("https://x.com/?utm_source=old&foo=bar").unwrap(),
///     "https://x.com/?foo=bar"
/// );
/// assert!(validate_url("ftp://x.com").is_err());
/// ```
pub fn validate_url(raw: &str) -> Result<String, UrlValidationError> {
    let input = raw.trim();
    let lowered_prefix: String = input.chars().take(8).collect::<String>().to_ascii_lowercase();
    if !lowered_prefix.starts_with("http://") && !lowered_prefix.starts_with("https://") {
        return Err(UrlValidationError::UnsupportedProtocol);
    }

    let mut url =
        Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlValidationError::MissingHost),
    }

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        let _ = url.set_port(None);
    }

    if let Some(query) = url.query() {
        let kept = strip_tracking_params(query);
        url.set_query(if kept.is_empty() { None } else { Some(&kept) });
    }

    let clean = url.to_string();
    if clean.len() > MAX_LANDING_URL_LEN {
        return Err(UrlValidationError::TooLong {
            actual: clean.len(),
            max: MAX_LANDING_URL_LEN,
        });
    }

    Ok(clean)
}

/// Removes tracking pairs from a raw query string, leaving the rest untouched.
fn strip_tracking_params(query: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let raw_key = pair.split('=').next().unwrap_or_default();
            let key: String = url::form_urlencoded::parse(raw_key.as_bytes())
                .map(|(k, _)| k.into_owned())
                .next()
                .unwrap_or_default();
            !is_tracking_param(&key)
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Returns true for the five `utm_*` keys (ASCII case-insensitive).
pub fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS
        .iter()
        .any(|param| param.eq_ignore_ascii_case(key))
}

/// Derives a human-readable label (`host/path`) for a clean landing-page URL.
pub fn default_label(clean_url: &str) -> String {
    match Url::parse(clean_url) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            let path = url.path().trim_end_matches('/');
            format!("{host}{path}")
        }
        Err(_) => clean_url.to_string(),
    }
}
