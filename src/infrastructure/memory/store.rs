//! In-memory implementation of every persistence repository.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;

use crate::domain::entities::{
    LandingPageRecord, NewLandingPage, NewTag, NewTrackingLink, Tag, TrackingLinkRecord,
};
use crate::domain::repositories::{
    CampaignRepository, LandingPageRepository, TagRepository, TrackingLinkRepository,
};
use crate::error::AppError;

#[derive(Debug)]
struct CampaignRow {
    account_id: String,
    name: String,
    archived: bool,
    last_used: u64,
}

#[derive(Debug)]
struct Owned<T> {
    account_id: String,
    record: T,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    clock: u64,
    campaigns: Vec<CampaignRow>,
    landing_pages: Vec<Owned<LandingPageRecord>>,
    tags: Vec<Owned<Tag>>,
    links: Vec<Owned<TrackingLinkRecord>>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn touch_campaign(&mut self, account_id: &str, name: &str) {
        self.clock += 1;
        let clock = self.clock;
        match self
            .campaigns
            .iter_mut()
            .find(|c| c.account_id == account_id && c.name == name)
        {
            Some(campaign) => campaign.last_used = clock,
            None => self.campaigns.push(CampaignRow {
                account_id: account_id.to_string(),
                name: name.to_string(),
                archived: false,
                last_used: clock,
            }),
        }
    }
}

/// Mirrors the PostgreSQL repositories' constraints in memory.
///
/// Landing pages and tracking links are idempotent on the same keys as the
/// database tables; tags conflict on a case-insensitive name match. Writes can
/// be made to fail with [`InMemoryStore::fail_next_writes`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    failing_writes: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` writes fail with an internal error.
    pub fn fail_next_writes(&self, count: u32) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Hides a campaign from the recent-campaign list.
    pub async fn archive_campaign(&self, account_id: &str, name: &str) -> bool {
        let mut state = self.state.lock().await;
        match state
            .campaigns
            .iter_mut()
            .find(|c| c.account_id == account_id && c.name == name)
        {
            Some(campaign) => {
                campaign.archived = true;
                true
            }
            None => false,
        }
    }

    pub async fn tracking_link_count(&self, account_id: &str) -> usize {
        let state = self.state.lock().await;
        state
            .links
            .iter()
            .filter(|l| l.account_id == account_id)
            .count()
    }

    pub async fn landing_page_count(&self, account_id: &str) -> usize {
        let state = self.state.lock().await;
        state
            .landing_pages
            .iter()
            .filter(|p| p.account_id == account_id)
            .count()
    }

    fn check_write(&self) -> Result<(), AppError> {
        let injected = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            Err(AppError::internal(
                "Storage unavailable",
                json!({ "backend": "memory" }),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CampaignRepository for InMemoryStore {
    async fn recent_campaign_names(
        &self,
        account_id: &str,
        limit: usize,
    ) -> Result<Vec<String>, AppError> {
        let state = self.state.lock().await;
        let mut campaigns: Vec<&CampaignRow> = state
            .campaigns
            .iter()
            .filter(|c| c.account_id == account_id && !c.archived)
            .collect();
        campaigns.sort_by(|a, b| b.last_used.cmp(&a.last_used));

        Ok(campaigns
            .into_iter()
            .take(limit)
            .map(|c| c.name.clone())
            .collect())
    }
}

#[async_trait]
impl LandingPageRepository for InMemoryStore {
    async fn known_urls(&self, account_id: &str) -> Result<Vec<String>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .landing_pages
            .iter()
            .filter(|p| p.account_id == account_id)
            .map(|p| p.record.url.clone())
            .collect())
    }

    async fn create(&self, page: NewLandingPage) -> Result<LandingPageRecord, AppError> {
        self.check_write()?;
        let mut state = self.state.lock().await;

        if let Some(existing) = state.landing_pages.iter().find(|p| {
            p.account_id == page.account_id
                && p.record.campaign_name == page.campaign_name
                && p.record.url == page.url
        }) {
            return Ok(existing.record.clone());
        }

        let record = LandingPageRecord {
            id: state.next_id(),
            campaign_name: page.campaign_name,
            url: page.url,
            label: page.label,
            created_at: Utc::now(),
        };
        state.landing_pages.push(Owned {
            account_id: page.account_id,
            record: record.clone(),
        });
        Ok(record)
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn list(&self, account_id: &str) -> Result<Vec<Tag>, AppError> {
        let state = self.state.lock().await;
        let mut tags: Vec<Tag> = state
            .tags
            .iter()
            .filter(|t| t.account_id == account_id)
            .map(|t| t.record.clone())
            .collect();
        tags.sort_by_key(|t| t.name.to_lowercase());
        Ok(tags)
    }

    async fn find_by_name(&self, account_id: &str, name: &str) -> Result<Option<Tag>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .tags
            .iter()
            .find(|t| t.account_id == account_id && t.record.same_name(name))
            .map(|t| t.record.clone()))
    }

    async fn create(&self, tag: NewTag) -> Result<Tag, AppError> {
        self.check_write()?;
        let mut state = self.state.lock().await;

        if state
            .tags
            .iter()
            .any(|t| t.account_id == tag.account_id && t.record.same_name(&tag.name))
        {
            return Err(AppError::conflict(
                "Tag already exists",
                json!({ "name": tag.name }),
            ));
        }

        let record = Tag::new(state.next_id(), tag.name.trim().to_string(), Utc::now());
        state.tags.push(Owned {
            account_id: tag.account_id,
            record: record.clone(),
        });
        Ok(record)
    }
}

#[async_trait]
impl TrackingLinkRepository for InMemoryStore {
    async fn create(&self, link: NewTrackingLink) -> Result<TrackingLinkRecord, AppError> {
        self.check_write()?;
        let mut state = self.state.lock().await;
        state.touch_campaign(&link.account_id, &link.campaign);

        if let Some(existing) = state.links.iter().find(|l| {
            l.account_id == link.account_id && l.record.full_tracking_url == link.full_tracking_url
        }) {
            return Ok(existing.record.clone());
        }

        let record = TrackingLinkRecord {
            id: state.next_id(),
            full_tracking_url: link.full_tracking_url,
            campaign: link.campaign,
            created_at: Utc::now(),
        };
        state.links.push(Owned {
            account_id: link.account_id,
            record: record.clone(),
        });
        Ok(record)
    }
}
