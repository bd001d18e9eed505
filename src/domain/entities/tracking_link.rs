//! Tracking link entities.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::landing_page::LandingPage;

/// One fully-specified (source, medium, content, term, landing page) tuple.
///
/// Empty `content`/`term` stand for "not set" and produce no query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub source: String,
    pub medium: String,
    pub content: String,
    pub term: String,
    pub landing_page: LandingPage,
}

/// A tracking link produced by the link generator at commit time.
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedLink {
    pub target_url: String,
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub content: String,
    pub term: String,
    pub tags: Vec<String>,
    pub full_tracking_url: String,
}

/// Input data for persisting a tracking link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrackingLink {
    pub account_id: String,
    pub user_id: String,
    pub target_url: String,
    pub campaign: String,
    pub source: String,
    pub medium: String,
    pub content: String,
    pub term: String,
    pub tags: Vec<String>,
    pub full_tracking_url: String,
}

impl NewTrackingLink {
    /// Builds the persistence payload for a generated link.
    pub fn from_generated(link: &GeneratedLink, account_id: &str, user_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            user_id: user_id.to_string(),
            target_url: link.target_url.clone(),
            campaign: link.campaign.clone(),
            source: link.source.clone(),
            medium: link.medium.clone(),
            content: link.content.clone(),
            term: link.term.clone(),
            tags: link.tags.clone(),
            full_tracking_url: link.full_tracking_url.clone(),
        }
    }
}

/// A persisted tracking link.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingLinkRecord {
    pub id: i64,
    pub full_tracking_url: String,
    pub campaign: String,
    pub created_at: DateTime<Utc>,
}
