//! Landing page entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A landing page chosen in a draft.
///
/// `url` is always the clean form returned by
/// [`crate::utils::url_validator::validate_url`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingPage {
    pub id: Uuid,
    pub url: String,
    pub label: String,
}

impl LandingPage {
    /// Creates a landing page with a fresh local id.
    pub fn new(url: String, label: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            label,
        }
    }
}

/// Input data for persisting a landing page under a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLandingPage {
    pub account_id: String,
    pub user_id: String,
    pub campaign_name: String,
    pub url: String,
    pub label: String,
}

/// A persisted landing page.
#[derive(Debug, Clone, Serialize)]
pub struct LandingPageRecord {
    pub id: i64,
    pub campaign_name: String,
    pub url: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_pages_get_distinct_ids() {
        let a = LandingPage::new("https://a.com/".to_string(), "a.com".to_string());
        let b = LandingPage::new("https://a.com/".to_string(), "a.com".to_string());
        assert_ne!(a.id, b.id);
        assert_eq!(a.url, b.url);
    }
}
