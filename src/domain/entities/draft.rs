//! Campaign draft: the selection aggregator for one conversation.
//!
//! The draft holds every choice made so far and is only mutated through the
//! methods below, which keep these invariants:
//!
//! - a content/term value can only be attached to a selected (source, medium) pair
//! - landing-page URLs are unique within the draft
//! - removing a source drops its mediums, content and terms; removing a medium
//!   drops its content and terms, so no orphan pair keys survive
//! - tag names are unique case-insensitively

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::landing_page::LandingPage;
use super::tracking_link::Combination;

/// Errors raised by draft operations that would break an invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("source '{0}' is not selected")]
    UnknownSource(String),

    #[error("medium '{medium}' is not selected for source '{utm_source}'")]
    UnknownPair { utm_source: String, medium: String },

    #[error("value must not be empty")]
    EmptyValue,
}

/// Direction of a toggle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Builds the `source|medium` composite key used for content and term maps.
pub fn pair_key(source: &str, medium: &str) -> String {
    format!("{source}|{medium}")
}

/// The in-progress selections of one conversation session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignDraft {
    name: String,
    is_existing_campaign: bool,
    existing_campaign_name: Option<String>,
    landing_pages: Vec<LandingPage>,
    selected_sources: Vec<String>,
    selected_mediums: BTreeMap<String, Vec<String>>,
    selected_content: BTreeMap<String, Vec<String>>,
    selected_term: BTreeMap<String, Vec<String>>,
    selected_tags: Vec<String>,
}

impl CampaignDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_existing_campaign(&self) -> bool {
        self.is_existing_campaign
    }

    pub fn existing_campaign_name(&self) -> Option<&str> {
        self.existing_campaign_name.as_deref()
    }

    /// Names a brand-new campaign.
    pub fn set_campaign(&mut self, name: String) {
        self.name = name;
        self.is_existing_campaign = false;
        self.existing_campaign_name = None;
    }

    /// Appends links to a campaign that already exists.
    pub fn use_existing_campaign(&mut self, name: String) {
        self.existing_campaign_name = Some(name.clone());
        self.name = name;
        self.is_existing_campaign = true;
    }

    pub fn landing_pages(&self) -> &[LandingPage] {
        &self.landing_pages
    }

    pub fn has_landing_page(&self, url: &str) -> bool {
        self.landing_pages.iter().any(|page| page.url == url)
    }

    /// Adds a landing page. Returns `false` (no-op) if the URL is already present.
    pub fn add_landing_page(&mut self, url: String, label: String) -> bool {
        if self.has_landing_page(&url) {
            return false;
        }
        self.landing_pages.push(LandingPage::new(url, label));
        true
    }

    pub fn sources(&self) -> &[String] {
        &self.selected_sources
    }

    pub fn has_source(&self, source: &str) -> bool {
        self.selected_sources.iter().any(|s| s == source)
    }

    /// Adds the source if absent, otherwise removes it with everything under it.
    pub fn toggle_source(&mut self, source: &str) -> Result<Toggled, DraftError> {
        if source.is_empty() {
            return Err(DraftError::EmptyValue);
        }

        if self.has_source(source) {
            self.selected_sources.retain(|s| s != source);
            if let Some(mediums) = self.selected_mediums.remove(source) {
                for medium in mediums {
                    self.drop_pair(source, &medium);
                }
            }
            Ok(Toggled::Removed)
        } else {
            self.selected_sources.push(source.to_string());
            Ok(Toggled::Added)
        }
    }

    pub fn mediums_for(&self, source: &str) -> &[String] {
        self.selected_mediums
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_medium(&self, source: &str, medium: &str) -> bool {
        self.mediums_for(source).iter().any(|m| m == medium)
    }

    /// Flips a medium under a selected source; removal drops its content and terms.
    ///
    /// # Errors
    ///
    /// [`DraftError::UnknownSource`] if `source` is not selected.
    pub fn toggle_medium(&mut self, source: &str, medium: &str) -> Result<Toggled, DraftError> {
        if medium.is_empty() {
            return Err(DraftError::EmptyValue);
        }
        if !self.has_source(source) {
            return Err(DraftError::UnknownSource(source.to_string()));
        }

        let mediums = self.selected_mediums.entry(source.to_string()).or_default();
        if let Some(pos) = mediums.iter().position(|m| m == medium) {
            mediums.remove(pos);
            if mediums.is_empty() {
                self.selected_mediums.remove(source);
            }
            self.drop_pair(source, medium);
            Ok(Toggled::Removed)
        } else {
            mediums.push(medium.to_string());
            Ok(Toggled::Added)
        }
    }

    /// All selected (source, medium) pairs, in source then medium insertion order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.selected_sources
            .iter()
            .flat_map(|source| {
                self.mediums_for(source)
                    .iter()
                    .map(move |medium| (source.clone(), medium.clone()))
            })
            .collect()
    }

    pub fn content_for(&self, source: &str, medium: &str) -> &[String] {
        self.selected_content
            .get(&pair_key(source, medium))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn terms_for(&self, source: &str, medium: &str) -> &[String] {
        self.selected_term
            .get(&pair_key(source, medium))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Flips a content value on a selected pair.
    ///
    /// # Errors
    ///
    /// [`DraftError::UnknownPair`] if the pair is not selected.
    pub fn toggle_content(
        &mut self,
        source: &str,
        medium: &str,
        value: &str,
    ) -> Result<Toggled, DraftError> {
        self.ensure_pair(source, medium, value)?;
        Ok(toggle_in(
            &mut self.selected_content,
            pair_key(source, medium),
            value,
        ))
    }

    /// Flips a term value on a selected pair.
    ///
    /// # Errors
    ///
    /// [`DraftError::UnknownPair`] if the pair is not selected.
    pub fn toggle_term(
        &mut self,
        source: &str,
        medium: &str,
        value: &str,
    ) -> Result<Toggled, DraftError> {
        self.ensure_pair(source, medium, value)?;
        Ok(toggle_in(
            &mut self.selected_term,
            pair_key(source, medium),
            value,
        ))
    }

    /// True if every selected pair carries `value` as a term.
    pub fn term_on_all_pairs(&self, value: &str) -> bool {
        let pairs = self.pairs();
        !pairs.is_empty()
            && pairs
                .iter()
                .all(|(s, m)| self.terms_for(s, m).iter().any(|t| t == value))
    }

    /// Applies a term to every selected pair at once.
    ///
    /// If every pair already has it, it is removed from all of them; otherwise it
    /// is added where missing. Each change goes through [`Self::toggle_term`].
    pub fn toggle_term_on_all_pairs(&mut self, value: &str) -> Result<Toggled, DraftError> {
        if value.is_empty() {
            return Err(DraftError::EmptyValue);
        }

        let remove = self.term_on_all_pairs(value);
        for (source, medium) in self.pairs() {
            let present = self.terms_for(&source, &medium).iter().any(|t| t == value);
            if present == remove {
                self.toggle_term(&source, &medium, value)?;
            }
        }

        Ok(if remove {
            Toggled::Removed
        } else {
            Toggled::Added
        })
    }

    /// Single-select variant: every pair ends up with exactly `value`, or with no
    /// term when `value` was already the sole term everywhere.
    pub fn replace_term_on_all_pairs(&mut self, value: &str) -> Result<Toggled, DraftError> {
        if value.is_empty() {
            return Err(DraftError::EmptyValue);
        }

        let pairs = self.pairs();
        let already_sole = !pairs.is_empty()
            && pairs
                .iter()
                .all(|(s, m)| self.terms_for(s, m) == [value.to_string()]);

        for (source, medium) in &pairs {
            let existing: Vec<String> = self.terms_for(source, medium).to_vec();
            for term in existing.iter().filter(|t| t.as_str() != value) {
                self.toggle_term(source, medium, term)?;
            }
            let present = existing.iter().any(|t| t == value);
            if present == already_sole {
                self.toggle_term(source, medium, value)?;
            }
        }

        Ok(if already_sole {
            Toggled::Removed
        } else {
            Toggled::Added
        })
    }

    /// Every term selected on any pair, first-seen order.
    pub fn all_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for (source, medium) in self.pairs() {
            for term in self.terms_for(&source, &medium) {
                if !terms.contains(term) {
                    terms.push(term.clone());
                }
            }
        }
        terms
    }

    pub fn tags(&self) -> &[String] {
        &self.selected_tags
    }

    pub fn has_tag(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.selected_tags
            .iter()
            .any(|t| t.to_lowercase() == wanted)
    }

    /// Attaches a tag that the persistence gateway has confirmed exists.
    ///
    /// Returns `false` if a tag with the same name (ignoring case) is already attached.
    pub fn attach_tag(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.has_tag(name) {
            return false;
        }
        self.selected_tags.push(name.to_string());
        true
    }

    /// Detaches a tag, matching case-insensitively.
    pub fn detach_tag(&mut self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        let before = self.selected_tags.len();
        self.selected_tags.retain(|t| t.to_lowercase() != wanted);
        before != self.selected_tags.len()
    }

    /// Expands the draft into the full cartesian product of tracking combinations.
    ///
    /// Order: source (insertion) → medium (insertion) → content → term → landing
    /// page. A pair without content contributes a single empty content, and
    /// likewise for terms, so such pairs still yield one link per landing page.
    pub fn compute_combinations(&self) -> Vec<Combination> {
        let empty = [String::new()];
        let mut combinations = Vec::with_capacity(self.combination_count());

        for (source, medium) in self.pairs() {
            let contents = non_empty_or(self.content_for(&source, &medium), &empty);
            let terms = non_empty_or(self.terms_for(&source, &medium), &empty);

            for content in contents {
                for term in terms {
                    for page in &self.landing_pages {
                        combinations.push(Combination {
                            source: source.clone(),
                            medium: medium.clone(),
                            content: content.clone(),
                            term: term.clone(),
                            landing_page: page.clone(),
                        });
                    }
                }
            }
        }

        combinations
    }

    /// Number of combinations without materializing them:
    /// Σ over pairs of max(1,|content|) × max(1,|term|) × |landing pages|.
    pub fn combination_count(&self) -> usize {
        self.pairs()
            .iter()
            .map(|(s, m)| {
                self.content_for(s, m).len().max(1)
                    * self.terms_for(s, m).len().max(1)
                    * self.landing_pages.len()
            })
            .sum()
    }

    fn ensure_pair(&self, source: &str, medium: &str, value: &str) -> Result<(), DraftError> {
        if value.is_empty() {
            return Err(DraftError::EmptyValue);
        }
        if !self.has_medium(source, medium) {
            return Err(DraftError::UnknownPair {
                utm_source: source.to_string(),
                medium: medium.to_string(),
            });
        }
        Ok(())
    }

    fn drop_pair(&mut self, source: &str, medium: &str) {
        let key = pair_key(source, medium);
        self.selected_content.remove(&key);
        self.selected_term.remove(&key);
    }
}

fn toggle_in(map: &mut BTreeMap<String, Vec<String>>, key: String, value: &str) -> Toggled {
    let values = map.entry(key.clone()).or_default();
    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
        if values.is_empty() {
            map.remove(&key);
        }
        Toggled::Removed
    } else {
        values.push(value.to_string());
        Toggled::Added
    }
}

fn non_empty_or<'a>(values: &'a [String], fallback: &'a [String]) -> &'a [String] {
    if values.is_empty() { fallback } else { values }
}
