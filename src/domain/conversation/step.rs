//! Conversation steps and their static properties.
//!
//! ```text
//! welcome → campaign-type → {campaign-name | existing-campaign} → landing-pages
//!   → sources → mediums(per source) → content(per source × medium) → terms
//!   → tags → review → commit → complete
//! ```

use serde::Serialize;

/// A step of the campaign-construction flow.
///
/// `Mediums` and `Content` are inner loops: the cursor names the source (and
/// medium) currently being processed, in draft insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum Step {
    Welcome,
    CampaignType,
    CampaignName,
    ExistingCampaign,
    LandingPages,
    Sources,
    Mediums { source: String },
    Content { source: String, medium: String },
    Terms,
    Tags,
    Review,
    /// A commit batch is in flight.
    Commit,
    Complete,
}

/// Where a step's suggestions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionSource {
    RecentCampaigns,
    KnownLandingPages,
    ContentFor { source: String, medium: String },
    Terms,
    KnownTags,
}

impl Step {
    /// The suggestion feed this step renders, if any.
    pub fn suggestion_source(&self) -> Option<SuggestionSource> {
        match self {
            Step::ExistingCampaign => Some(SuggestionSource::RecentCampaigns),
            Step::LandingPages => Some(SuggestionSource::KnownLandingPages),
            Step::Content { source, medium } => Some(SuggestionSource::ContentFor {
                source: source.clone(),
                medium: medium.clone(),
            }),
            Step::Terms => Some(SuggestionSource::Terms),
            Step::Tags => Some(SuggestionSource::KnownTags),
            _ => None,
        }
    }

    /// Whether `back` is offered on this step.
    pub fn allows_back(&self) -> bool {
        !matches!(self, Step::Welcome | Step::Commit | Step::Complete)
    }

    /// Whether the step takes free-text input.
    pub fn accepts_text(&self) -> bool {
        matches!(
            self,
            Step::CampaignName
                | Step::ExistingCampaign
                | Step::LandingPages
                | Step::Sources
                | Step::Mediums { .. }
                | Step::Content { .. }
                | Step::Terms
                | Step::Tags
        )
    }

    /// Stable identifier used in logs; matches the serialized name.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Welcome => "welcome",
            Step::CampaignType => "campaign-type",
            Step::CampaignName => "campaign-name",
            Step::ExistingCampaign => "existing-campaign",
            Step::LandingPages => "landing-pages",
            Step::Sources => "sources",
            Step::Mediums { .. } => "mediums",
            Step::Content { .. } => "content",
            Step::Terms => "terms",
            Step::Tags => "tags",
            Step::Review => "review",
            Step::Commit => "commit",
            Step::Complete => "complete",
        }
    }
}
