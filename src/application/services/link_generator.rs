//! Link generation: turns a finished draft into tracking links.

use url::Url;

use crate::domain::entities::{CampaignDraft, Combination, GeneratedLink};
use crate::utils::sanitize::sanitize_parameter;
use crate::utils::url_validator::{UrlValidationError, validate_url};

/// Hard ceiling on a finished tracking URL, parameters included.
pub const MAX_TRACKING_URL_LEN: usize = 2000;

/// Reasons a whole batch is rejected.
///
/// Every variant is fatal for the batch: nothing is persisted when one occurs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkGenerationError {
    #[error("the campaign name is empty")]
    MissingCampaign,

    #[error("the {field} value '{raw}' is empty after sanitization")]
    EmptyParameter { field: &'static str, raw: String },

    #[error("landing page {url} is invalid: {source}")]
    InvalidLandingPage {
        url: String,
        #[source]
        source: UrlValidationError,
    },

    #[error("a generated link is {length} characters long, the maximum is {max}")]
    LinkTooLong { url: String, length: usize, max: usize },
}

/// Generates one link per combination of the draft, in combination order.
///
/// Parameters are appended in the fixed order `utm_source`, `utm_medium`,
/// `utm_campaign`, `utm_content`, `utm_term`; empty content and term values
/// are omitted.
///
/// # Errors
///
/// Fails the whole batch if any parameter sanitizes to nothing, a landing page
/// no longer validates, or any resulting URL exceeds [`MAX_TRACKING_URL_LEN`].
pub fn generate_links(draft: &CampaignDraft) -> Result<Vec<GeneratedLink>, LinkGenerationError> {
    let campaign = sanitize_parameter(draft.name());
    if campaign.is_empty() {
        return Err(LinkGenerationError::MissingCampaign);
    }

    let tags = draft.tags().to_vec();
    draft
        .compute_combinations()
        .iter()
        .map(|combination| build_link(combination, &campaign, &tags))
        .collect()
}

fn build_link(
    combination: &Combination,
    campaign: &str,
    tags: &[String],
) -> Result<GeneratedLink, LinkGenerationError> {
    let source = required("source", &combination.source)?;
    let medium = required("medium", &combination.medium)?;
    let content = sanitize_parameter(&combination.content);
    let term = sanitize_parameter(&combination.term);

    let target = &combination.landing_page.url;
    let clean = validate_url(target).map_err(|source| LinkGenerationError::InvalidLandingPage {
        url: target.clone(),
        source,
    })?;

    let mut url = Url::parse(&clean).map_err(|e| LinkGenerationError::InvalidLandingPage {
        url: target.clone(),
        source: UrlValidationError::InvalidFormat(e.to_string()),
    })?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("utm_source", &source)
            .append_pair("utm_medium", &medium)
            .append_pair("utm_campaign", campaign);
        if !content.is_empty() {
            query.append_pair("utm_content", &content);
        }
        if !term.is_empty() {
            query.append_pair("utm_term", &term);
        }
    }

    let full_tracking_url = url.to_string();
    let length = full_tracking_url.len();
    if length > MAX_TRACKING_URL_LEN {
        return Err(LinkGenerationError::LinkTooLong {
            url: full_tracking_url,
            length,
            max: MAX_TRACKING_URL_LEN,
        });
    }

    Ok(GeneratedLink {
        target_url: clean,
        source,
        medium,
        campaign: campaign.to_string(),
        content,
        term,
        tags: tags.to_vec(),
        full_tracking_url,
    })
}

fn required(field: &'static str, raw: &str) -> Result<String, LinkGenerationError> {
    let value = sanitize_parameter(raw);
    if value.is_empty() {
        return Err(LinkGenerationError::EmptyParameter {
            field,
            raw: raw.to_string(),
        });
    }
    Ok(value)
}
