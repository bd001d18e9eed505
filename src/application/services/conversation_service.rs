//! Conversation orchestration: runs session effects against the gateway.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::application::services::link_generator::generate_links;
use crate::application::services::tag_service::TagService;
use crate::application::session_store::{SessionHandle, SessionStore};
use crate::domain::conversation::{
    CampaignSession, Effect, FlowSettings, Owner, SessionSnapshot, SuggestionSource, Ticket,
    UserAction,
};
use crate::domain::entities::{
    GeneratedLink, LandingPage, NewLandingPage, NewTag, NewTrackingLink, Suggestion,
    rank_most_used,
};
use crate::domain::repositories::{
    CampaignRepository, LandingPageRepository, SuggestionProvider, TagRepository,
    TrackingLinkRepository,
};
use crate::domain::retry_controller::Recovery;
use crate::error::AppError;
use crate::utils::sanitize::sanitize_parameter;

/// The persistence collaborators a conversation writes through.
#[derive(Clone)]
pub struct Gateway {
    pub campaigns: Arc<dyn CampaignRepository>,
    pub landing_pages: Arc<dyn LandingPageRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub links: Arc<dyn TrackingLinkRepository>,
}

/// Drives conversation sessions.
///
/// Each action is applied under the session's lock. Network work requested by
/// the session runs with the lock released and its result is handed back to
/// the session, which drops it if the conversation has moved on.
pub struct ConversationService {
    store: Arc<SessionStore>,
    gateway: Gateway,
    tags: TagService<dyn TagRepository>,
    suggestions: Arc<dyn SuggestionProvider>,
    settings: FlowSettings,
}

impl ConversationService {
    pub fn new(
        store: Arc<SessionStore>,
        gateway: Gateway,
        suggestions: Arc<dyn SuggestionProvider>,
        settings: FlowSettings,
    ) -> Self {
        let tags = TagService::new(gateway.tags.clone());
        Self {
            store,
            gateway,
            tags,
            suggestions,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Starts a new conversation for a user.
    pub async fn create_session(&self, owner: Owner) -> SessionSnapshot {
        let session = CampaignSession::new(Uuid::new_v4(), owner, self.settings.clone());
        let snapshot = session.snapshot();
        self.store.insert(session).await;

        metrics::counter!("campaign_sessions_created_total").increment(1);
        tracing::info!(
            session_id = %snapshot.id,
            account_id = %snapshot.owner.account_id,
            "Conversation started"
        );
        snapshot
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown session ids.
    pub async fn get_session(&self, id: Uuid) -> Result<SessionSnapshot, AppError> {
        let handle = self.handle(id).await?;
        let session = handle.lock().await;
        Ok(session.snapshot())
    }

    /// Discards a session with its draft and transcript.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown session ids.
    pub async fn delete_session(&self, id: Uuid) -> Result<(), AppError> {
        if self.store.remove(id).await {
            tracing::info!(session_id = %id, "Conversation discarded");
            Ok(())
        } else {
            Err(session_not_found(id))
        }
    }

    /// Applies a user action and runs whatever it requires.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown session ids. Gateway failures
    /// are reported inside the conversation, not as errors.
    pub async fn apply_action(
        &self,
        id: Uuid,
        action: UserAction,
    ) -> Result<SessionSnapshot, AppError> {
        // Held until the effect has been applied so the sweeper leaves the
        // session alone while its lock is released for network work.
        let (handle, _in_flight) = self
            .store
            .checkout(id)
            .await
            .ok_or_else(|| session_not_found(id))?;

        let effect = {
            let mut session = handle.lock().await;
            tracing::debug!(
                session_id = %id,
                step = session.step().name(),
                action = ?action.kind(),
                "Applying action"
            );
            session.handle(action)
        };

        self.run_effect(&handle, effect).await;

        let session = handle.lock().await;
        Ok(session.snapshot())
    }

    async fn handle(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| session_not_found(id))
    }

    async fn run_effect(&self, handle: &SessionHandle, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::LoadSuggestions { ticket, source } => {
                let owner = handle.lock().await.owner().clone();
                let (suggestions, reached_gateway) = self.load_suggestions(&owner, &source).await;

                let mut session = handle.lock().await;
                if !session.receive_suggestions(&ticket, suggestions, reached_gateway) {
                    tracing::debug!(session_id = %session.id(), "Discarded stale suggestions");
                }
            }
            Effect::CreateTag { ticket, name } => {
                let owner = handle.lock().await.owner().clone();
                let result = self
                    .tags
                    .register(NewTag {
                        name: name.clone(),
                        user_id: owner.user_id,
                        account_id: owner.account_id,
                    })
                    .await
                    .map(|outcome| outcome.into_tag().name);

                let mut session = handle.lock().await;
                session.tag_registered(&ticket, &name, result);
                if session.recovery() == Some(Recovery::Fallback) {
                    metrics::counter!("campaign_fallbacks_total").increment(1);
                }
            }
            Effect::Commit { ticket } => self.commit(handle, ticket).await,
        }
    }

    /// Generates the links and persists the batch.
    ///
    /// Generation runs under the lock and never writes; persistence runs
    /// without it, landing pages first and then links, one at a time.
    async fn commit(&self, handle: &SessionHandle, ticket: Ticket) {
        let (owner, campaign, pages, links) = {
            let mut session = handle.lock().await;
            match generate_links(session.draft()) {
                Ok(links) => (
                    session.owner().clone(),
                    session.draft().name().to_string(),
                    session.draft().landing_pages().to_vec(),
                    links,
                ),
                Err(e) => {
                    tracing::warn!(session_id = %session.id(), error = %e, "Commit aborted");
                    session.commit_aborted(&ticket, &e.to_string());
                    return;
                }
            }
        };

        match self.persist_batch(&owner, &campaign, &pages, &links).await {
            Ok(()) => {
                metrics::counter!("campaign_links_generated_total").increment(links.len() as u64);
                tracing::info!(
                    account_id = %owner.account_id,
                    campaign = %campaign,
                    links = links.len(),
                    "Tracking links created"
                );
                handle.lock().await.commit_succeeded(&ticket, links);
            }
            Err(e) => {
                metrics::counter!("campaign_commit_failures_total").increment(1);
                tracing::warn!(account_id = %owner.account_id, error = %e, "Commit failed");

                let mut session = handle.lock().await;
                if session.commit_failed(&ticket, &e) == Some(Recovery::Fallback) {
                    metrics::counter!("campaign_fallbacks_total").increment(1);
                }
            }
        }
    }

    /// Writes the batch sequentially without rollback.
    ///
    /// Both repositories are idempotent, so re-running the whole batch after a
    /// partial failure does not duplicate rows.
    async fn persist_batch(
        &self,
        owner: &Owner,
        campaign: &str,
        pages: &[LandingPage],
        links: &[GeneratedLink],
    ) -> Result<(), AppError> {
        for page in pages {
            let result = self
                .gateway
                .landing_pages
                .create(NewLandingPage {
                    account_id: owner.account_id.clone(),
                    user_id: owner.user_id.clone(),
                    campaign_name: campaign.to_string(),
                    url: page.url.clone(),
                    label: page.label.clone(),
                })
                .await;
            accept_existing(result)?;
        }

        for link in links {
            let result = self
                .gateway
                .links
                .create(NewTrackingLink::from_generated(
                    link,
                    &owner.account_id,
                    &owner.user_id,
                ))
                .await;
            accept_existing(result)?;
        }

        Ok(())
    }

    /// Fetches the suggestions for a step.
    ///
    /// Returns the suggestions and whether a gateway call was seen to succeed.
    /// Failures never propagate: they degrade to an empty list.
    async fn load_suggestions(
        &self,
        owner: &Owner,
        source: &SuggestionSource,
    ) -> (Vec<Suggestion>, bool) {
        let account = owner.account_id.as_str();
        let result: Result<Vec<Suggestion>, AppError> = match source {
            SuggestionSource::RecentCampaigns => self
                .gateway
                .campaigns
                .recent_campaign_names(account, self.settings.recent_campaigns)
                .await
                .map(|names| names.into_iter().map(Suggestion::plain).collect()),
            SuggestionSource::KnownLandingPages => {
                self.gateway.landing_pages.known_urls(account).await.map(|urls| {
                    rank_most_used(&urls, self.settings.landing_page_suggestions)
                        .into_iter()
                        .map(Suggestion::plain)
                        .collect()
                })
            }
            SuggestionSource::KnownTags => self
                .tags
                .list(account)
                .await
                .map(|tags| tags.into_iter().map(|t| Suggestion::plain(t.name)).collect()),
            SuggestionSource::ContentFor { source, medium } => {
                let values = self
                    .suggestions
                    .fetch_content_suggestions(source, medium)
                    .await;
                // The provider reports failures as an empty list.
                let reached = !values.is_empty();
                return (
                    parameter_suggestions(values.into_iter().map(|v| (v, None))),
                    reached,
                );
            }
            SuggestionSource::Terms => {
                let terms = self.suggestions.fetch_term_suggestions(None).await;
                let reached = !terms.is_empty();
                return (
                    parameter_suggestions(terms.into_iter().map(|t| (t.value, t.description))),
                    reached,
                );
            }
        };

        match result {
            Ok(suggestions) => (suggestions, true),
            Err(e) => {
                tracing::warn!(error = %e, ?source, "Suggestion lookup failed, continuing without");
                (Vec::new(), false)
            }
        }
    }
}

/// Turns raw provider values into selectable tracking-parameter suggestions.
///
/// Values are sanitized; empties and duplicates are dropped. The raw text is
/// kept as the label.
pub fn parameter_suggestions(
    raw: impl IntoIterator<Item = (String, Option<String>)>,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = Vec::new();
    for (label, description) in raw {
        let value = sanitize_parameter(&label);
        if value.is_empty() || suggestions.iter().any(|s| s.value == value) {
            continue;
        }
        suggestions.push(Suggestion {
            value,
            label: label.trim().to_string(),
            description,
        });
    }
    suggestions
}

fn accept_existing<T>(result: Result<T, AppError>) -> Result<(), AppError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.is_conflict() => Ok(()),
        Err(e) => Err(e),
    }
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::not_found("Session not found", json!({ "session_id": id }))
}
