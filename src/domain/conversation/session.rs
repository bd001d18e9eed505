//! The per-session conversation aggregate.
//!
//! A [`CampaignSession`] owns one draft, one transcript and the step cursor.
//! It never performs I/O: operations that need the network come back to the
//! caller as an [`Effect`] carrying a [`Ticket`], and the result is fed back
//! through `receive_suggestions`, `tag_registered` or one of the `commit_*`
//! methods. A result whose ticket no longer matches the session is discarded.
//!
//! # Invariants
//!
//! - at most one commit is in flight; a second commit request is a silent no-op
//! - `generation` changes whenever the step changes, so results requested by
//!   an abandoned step are dropped
//! - bot turns are queued during an action and flushed in order at its end

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::mem;
use uuid::Uuid;

use crate::domain::entities::{CampaignDraft, GeneratedLink, Suggestion};
use crate::domain::retry_controller::{FailureKind, Recovery, RetryController, classify};
use crate::error::AppError;

use super::action::UserAction;
use super::render::{FailureNotice, Prompt, RenderContext, render};
use super::settings::FlowSettings;
use super::step::{Step, SuggestionSource};
use super::transcript::{Actor, Transcript};
use super::transition::{Directive, TransitionContext, transition};
use super::turns::{BotTurn, TurnQueue};

/// The user and account a session builds links for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub user_id: String,
    pub account_id: String,
}

/// Identifies the session state that requested an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub step: Step,
}

/// Work the caller must perform after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    LoadSuggestions {
        ticket: Ticket,
        source: SuggestionSource,
    },
    CreateTag {
        ticket: Ticket,
        name: String,
    },
    /// Generate and persist the links for the current draft.
    Commit { ticket: Ticket },
}

/// Owned copy of a session's observable state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub owner: Owner,
    pub step: Step,
    pub prompt: Prompt,
    pub transcript: Transcript,
    pub draft: CampaignDraft,
    pub combination_count: usize,
    pub recovery: Option<Recovery>,
    pub consecutive_errors: u32,
    pub links: Vec<GeneratedLink>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A failed operation that `retry` can re-run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingOperation {
    CreateTag(String),
    Commit,
}

#[derive(Debug)]
pub struct CampaignSession {
    id: Uuid,
    owner: Owner,
    settings: FlowSettings,
    step: Step,
    history: Vec<Step>,
    draft: CampaignDraft,
    transcript: Transcript,
    queue: TurnQueue,
    suggestions: Vec<Suggestion>,
    retry: RetryController,
    pending: Option<PendingOperation>,
    failure: Option<FailureNotice>,
    commit_in_flight: bool,
    links: Vec<GeneratedLink>,
    generation: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CampaignSession {
    /// Starts a session on the welcome step with a fresh draft.
    pub fn new(id: Uuid, owner: Owner, settings: FlowSettings) -> Self {
        let now = Utc::now();
        let retry = RetryController::new(settings.fallback_threshold);
        let mut session = Self {
            id,
            owner,
            settings,
            step: Step::Welcome,
            history: Vec::new(),
            draft: CampaignDraft::new(),
            transcript: Transcript::new(),
            queue: TurnQueue::new(),
            suggestions: Vec::new(),
            retry,
            pending: None,
            failure: None,
            commit_in_flight: false,
            links: Vec::new(),
            generation: 0,
            created_at: now,
            updated_at: now,
        };
        session.emit_prompt();
        session.flush();
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn draft(&self) -> &CampaignDraft {
        &self.draft
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn failure(&self) -> Option<&FailureNotice> {
        self.failure.as_ref()
    }

    pub fn recovery(&self) -> Option<Recovery> {
        self.failure.as_ref().map(|f| f.recovery)
    }

    pub fn links(&self) -> &[GeneratedLink] {
        &self.links
    }

    pub fn is_commit_in_flight(&self) -> bool {
        self.commit_in_flight
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.retry.consecutive_errors()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renders the current step.
    pub fn prompt(&self) -> Prompt {
        render(RenderContext {
            step: &self.step,
            draft: &self.draft,
            suggestions: &self.suggestions,
            failure: self.failure.as_ref(),
            links: &self.links,
            settings: &self.settings,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            owner: self.owner.clone(),
            step: self.step.clone(),
            prompt: self.prompt(),
            transcript: self.transcript.clone(),
            draft: self.draft.clone(),
            combination_count: self.draft.combination_count(),
            recovery: self.recovery(),
            consecutive_errors: self.retry.consecutive_errors(),
            links: self.links.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Applies one user action.
    pub fn handle(&mut self, action: UserAction) -> Effect {
        if self.commit_in_flight && matches!(action, UserAction::Commit | UserAction::Retry) {
            return Effect::None;
        }

        self.updated_at = Utc::now();
        self.transcript.push(Actor::User, action.describe(), None);

        let effect = match action {
            UserAction::Restart => self.restart(),
            UserAction::Retry => self.retry_pending(),
            _ if self.is_locked() => {
                self.reprompt("Please create the links manually or start over.");
                Effect::None
            }
            action => {
                self.failure = None;
                self.pending = None;
                self.apply(action)
            }
        };

        self.flush();
        effect
    }

    /// Applies loaded suggestions if the step that asked for them is still current.
    ///
    /// `reached_gateway` is true when the suggestions came from a gateway call
    /// that is known to have succeeded; that resets the failure counter.
    pub fn receive_suggestions(
        &mut self,
        ticket: &Ticket,
        suggestions: Vec<Suggestion>,
        reached_gateway: bool,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        if reached_gateway {
            self.retry.record_success();
        }
        if suggestions.is_empty() {
            return true;
        }

        self.suggestions = suggestions;
        if self.failure.is_none() {
            self.emit_prompt();
            self.flush();
        }
        true
    }

    /// Completes a tag registration started by [`Effect::CreateTag`].
    ///
    /// `result` carries the canonical tag name on success.
    pub fn tag_registered(
        &mut self,
        ticket: &Ticket,
        requested: &str,
        result: Result<String, AppError>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.updated_at = Utc::now();

        let outcome = match result {
            Ok(name) => Ok(name),
            Err(e) => match classify(&e) {
                FailureKind::SuccessEquivalent => Ok(requested.to_string()),
                kind => Err((kind, e)),
            },
        };

        match outcome {
            Ok(name) => {
                self.retry.record_success();
                if !self.suggestions.iter().any(|s| s.value == name) {
                    self.suggestions.push(Suggestion::plain(name.clone()));
                }
                let note = if self.draft.attach_tag(&name) {
                    format!("Tagged with {name}.")
                } else {
                    format!("{name} is already attached.")
                };
                self.queue.enqueue(BotTurn::text(note));
                self.emit_prompt();
            }
            Err((FailureKind::Input, e)) => {
                self.reprompt(&e.to_string());
            }
            Err((_, e)) => {
                tracing::debug!(error = %e, tag = requested, "Tag registration failed");
                self.record_failure(
                    format!("Couldn't save the tag {requested}."),
                    PendingOperation::CreateTag(requested.to_string()),
                );
            }
        }

        self.flush();
        true
    }

    /// Finishes a commit whose links were all persisted.
    pub fn commit_succeeded(&mut self, ticket: &Ticket, links: Vec<GeneratedLink>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.commit_in_flight = false;
        self.retry.record_success();
        self.links = links;
        self.history.clear();
        self.step = Step::Complete;
        self.generation += 1;
        self.updated_at = Utc::now();
        self.emit_prompt();
        self.flush();
        true
    }

    /// Records a failed commit batch and returns to review.
    ///
    /// Returns the recovery offered when the failure was counted.
    pub fn commit_failed(&mut self, ticket: &Ticket, error: &AppError) -> Option<Recovery> {
        if !self.is_current(ticket) {
            return None;
        }

        self.leave_commit();
        let recovery = match classify(error) {
            FailureKind::Input => {
                self.reprompt(&format!("Some links could not be saved: {error}"));
                None
            }
            _ => Some(self.record_failure(
                "Saving your links failed.".to_string(),
                PendingOperation::Commit,
            )),
        };

        self.flush();
        recovery
    }

    /// Aborts a commit that cannot succeed however often it is retried.
    ///
    /// Not counted as a failure; only a restart is offered.
    pub fn commit_aborted(&mut self, ticket: &Ticket, reason: &str) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.leave_commit();
        self.pending = None;
        let recovery = self
            .retry
            .record(FailureKind::Fatal)
            .unwrap_or(Recovery::Restart);
        self.failure = Some(FailureNotice {
            message: format!("These links can't be created: {reason}"),
            recovery,
        });
        self.emit_prompt();
        self.flush();
        true
    }

    fn apply(&mut self, action: UserAction) -> Effect {
        let directive = transition(
            &self.step,
            &mut self.draft,
            &action,
            TransitionContext {
                settings: &self.settings,
                suggestions: &self.suggestions,
            },
        );

        match directive {
            Directive::Advance(next) => {
                let previous = mem::replace(&mut self.step, next);
                self.history.push(previous);
                self.enter_step()
            }
            Directive::Back => match self.history.pop() {
                Some(previous) => {
                    self.step = previous;
                    self.enter_step()
                }
                None => {
                    self.reprompt("There is nothing to go back to.");
                    Effect::None
                }
            },
            Directive::Stay(note) => {
                if let Some(note) = note {
                    self.queue.enqueue(BotTurn::text(note));
                }
                self.emit_prompt();
                Effect::None
            }
            Directive::Reprompt(message) => {
                self.reprompt(&message);
                Effect::None
            }
            Directive::CreateTag(name) => {
                self.queue
                    .enqueue(BotTurn::text(format!("Saving the tag {name}...")));
                Effect::CreateTag {
                    ticket: self.ticket(),
                    name,
                }
            }
            Directive::Commit => self.begin_commit(),
        }
    }

    fn enter_step(&mut self) -> Effect {
        self.generation += 1;
        self.suggestions.clear();
        self.failure = None;
        self.pending = None;
        self.emit_prompt();

        match self.step.suggestion_source() {
            Some(source) => Effect::LoadSuggestions {
                ticket: self.ticket(),
                source,
            },
            None => Effect::None,
        }
    }

    fn begin_commit(&mut self) -> Effect {
        if self.commit_in_flight {
            return Effect::None;
        }

        self.commit_in_flight = true;
        self.failure = None;
        self.pending = None;
        self.step = Step::Commit;
        self.generation += 1;
        self.emit_prompt();

        Effect::Commit {
            ticket: self.ticket(),
        }
    }

    fn leave_commit(&mut self) {
        self.commit_in_flight = false;
        self.step = Step::Review;
        self.generation += 1;
        self.updated_at = Utc::now();
    }

    fn retry_pending(&mut self) -> Effect {
        let retryable = matches!(
            self.failure,
            Some(FailureNotice {
                recovery: Recovery::Retry,
                ..
            })
        );

        match self.pending.take() {
            Some(operation) if retryable => {
                self.failure = None;
                match operation {
                    PendingOperation::CreateTag(name) => Effect::CreateTag {
                        ticket: self.ticket(),
                        name,
                    },
                    PendingOperation::Commit => self.begin_commit(),
                }
            }
            operation => {
                self.pending = operation;
                let message = if self.is_locked() {
                    "Please create the links manually or start over."
                } else {
                    "There is nothing to retry."
                };
                self.reprompt(message);
                Effect::None
            }
        }
    }

    fn restart(&mut self) -> Effect {
        if self.commit_in_flight {
            self.reprompt("Your links are being created, please wait.");
            return Effect::None;
        }

        self.step = Step::Welcome;
        self.history.clear();
        self.draft = CampaignDraft::new();
        self.transcript.clear();
        self.queue.discard();
        self.suggestions.clear();
        self.retry.reset();
        self.pending = None;
        self.failure = None;
        self.links.clear();
        self.generation += 1;
        self.emit_prompt();
        Effect::None
    }

    fn record_failure(&mut self, message: String, operation: PendingOperation) -> Recovery {
        let recovery = self.retry.record_failure();
        let message = match recovery {
            Recovery::Fallback => format!(
                "{message} This keeps failing, so you can create the links manually or start over."
            ),
            _ => message,
        };

        self.pending = (recovery == Recovery::Retry).then_some(operation);
        self.failure = Some(FailureNotice { message, recovery });
        self.emit_prompt();
        recovery
    }

    fn is_locked(&self) -> bool {
        matches!(
            self.recovery(),
            Some(Recovery::Fallback | Recovery::Restart)
        )
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation && ticket.step == self.step
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
            step: self.step.clone(),
        }
    }

    fn reprompt(&mut self, message: &str) {
        self.queue.enqueue(BotTurn::text(message));
        self.emit_prompt();
    }

    fn emit_prompt(&mut self) {
        let prompt = self.prompt();
        self.queue
            .enqueue(BotTurn::with_options(prompt.text, prompt.options));
    }

    fn flush(&mut self) {
        self.queue.flush(&mut self.transcript);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::action::ActionKind;
    use serde_json::json;

    fn session() -> CampaignSession {
        CampaignSession::new(
            Uuid::new_v4(),
            Owner {
                user_id: "user-1".to_string(),
                account_id: "acct-1".to_string(),
            },
            FlowSettings::default(),
        )
    }

    fn select(value: &str) -> UserAction {
        UserAction::Select(value.to_string())
    }

    fn enter(text: &str) -> UserAction {
        UserAction::Enter {
            text: text.to_string(),
            label: None,
        }
    }

    /// Drives a session to the review step with one link.
    fn at_review() -> CampaignSession {
        let mut s = session();
        s.handle(select("start"));
        s.handle(select("new"));
        s.handle(enter("Spring Sale"));
        s.handle(enter("https://shop.example.com/"));
        s.handle(UserAction::Continue);
        s.handle(select("google"));
        s.handle(UserAction::Continue);
        s.handle(select("cpc"));
        s.handle(UserAction::Continue);
        s.handle(UserAction::Skip);
        s.handle(UserAction::Skip);
        s.handle(UserAction::Skip);
        assert_eq!(s.step(), &Step::Review);
        s
    }

    fn commit_ticket(effect: Effect) -> Ticket {
        match effect {
            Effect::Commit { ticket } => ticket,
            other => panic!("expected commit effect, got {other:?}"),
        }
    }

    fn offers(session: &CampaignSession, action: ActionKind) -> bool {
        session.prompt().options.iter().any(|o| o.action == action)
    }

    #[test]
    fn test_new_session_emits_welcome() {
        let s = session();
        assert_eq!(s.step(), &Step::Welcome);
        assert_eq!(s.transcript().len(), 1);
        let welcome = s.transcript().last().unwrap();
        assert_eq!(welcome.actor, Actor::Bot);
        assert!(welcome.offered_options.is_some());
    }

    #[test]
    fn test_transcript_grows_with_user_and_bot_turns() {
        let mut s = session();
        s.handle(select("start"));
        let messages = s.transcript().messages();
        assert_eq!(messages[1].actor, Actor::User);
        assert_eq!(messages[1].text, "start");
        assert_eq!(messages.last().unwrap().actor, Actor::Bot);
        assert_eq!(s.step(), &Step::CampaignType);
    }

    #[test]
    fn test_entering_suggestion_step_requests_load() {
        let mut s = session();
        s.handle(select("start"));
        let effect = s.handle(select("existing"));
        match effect {
            Effect::LoadSuggestions { ticket, source } => {
                assert_eq!(source, SuggestionSource::RecentCampaigns);
                assert_eq!(ticket.step, Step::ExistingCampaign);
            }
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn test_stale_suggestions_are_discarded() {
        let mut s = session();
        s.handle(select("start"));
        s.handle(select("new"));
        let ticket = match s.handle(enter("spring")) {
            Effect::LoadSuggestions { ticket, .. } => ticket,
            other => panic!("unexpected effect {other:?}"),
        };

        // User moves on before the load completes.
        s.handle(UserAction::Back);
        assert!(!s.receive_suggestions(&ticket, vec![Suggestion::plain("https://a.com/")], true));
        assert!(s.suggestions().is_empty());
    }

    #[test]
    fn test_suggestions_apply_to_current_step() {
        let mut s = session();
        s.handle(select("start"));
        s.handle(select("new"));
        let ticket = match s.handle(enter("spring")) {
            Effect::LoadSuggestions { ticket, .. } => ticket,
            other => panic!("unexpected effect {other:?}"),
        };
        assert!(s.receive_suggestions(&ticket, vec![Suggestion::plain("https://a.com/")], true));
        assert_eq!(s.suggestions().len(), 1);

        s.handle(select("https://a.com/"));
        assert_eq!(s.draft().landing_pages().len(), 1);
    }

    #[test]
    fn test_back_keeps_selections() {
        let mut s = session();
        s.handle(select("start"));
        s.handle(select("new"));
        s.handle(enter("spring"));
        s.handle(enter("https://a.com/"));
        s.handle(UserAction::Continue);
        s.handle(select("google"));
        s.handle(select("facebook"));
        s.handle(UserAction::Continue);
        assert_eq!(
            s.step(),
            &Step::Mediums {
                source: "google".to_string()
            }
        );

        s.handle(UserAction::Back);
        assert_eq!(s.step(), &Step::Sources);
        assert_eq!(s.draft().sources(), ["google", "facebook"]);
        let prompt = s.prompt();
        let google = prompt
            .options
            .iter()
            .find(|o| o.value.as_deref() == Some("google"))
            .unwrap();
        assert!(google.is_chosen());

        s.handle(UserAction::Back);
        assert_eq!(s.step(), &Step::LandingPages);
        assert_eq!(s.draft().landing_pages().len(), 1);
    }

    #[test]
    fn test_commit_guard_is_silent() {
        let mut s = at_review();
        let ticket = commit_ticket(s.handle(UserAction::Commit));
        assert!(s.is_commit_in_flight());
        let before = s.transcript().len();

        assert_eq!(s.handle(UserAction::Commit), Effect::None);
        assert_eq!(s.transcript().len(), before);

        // Restart is refused while the batch runs.
        assert_eq!(s.handle(UserAction::Restart), Effect::None);
        assert_eq!(s.step(), &Step::Commit);

        assert!(s.commit_succeeded(&ticket, Vec::new()));
        assert_eq!(s.step(), &Step::Complete);
        assert!(!s.is_commit_in_flight());
    }

    #[test]
    fn test_commit_failure_offers_retry() {
        let mut s = at_review();
        let ticket = commit_ticket(s.handle(UserAction::Commit));

        let recovery = s.commit_failed(&ticket, &AppError::internal("db down", json!({})));
        assert_eq!(recovery, Some(Recovery::Retry));
        assert_eq!(s.step(), &Step::Review);
        assert!(offers(&s, ActionKind::Retry));

        let effect = s.handle(UserAction::Retry);
        assert!(matches!(effect, Effect::Commit { .. }));
    }

    #[test]
    fn test_three_commit_failures_fall_back() {
        let mut s = at_review();
        let mut effect = s.handle(UserAction::Commit);

        for attempt in 1..=3 {
            let ticket = commit_ticket(effect);
            let recovery = s.commit_failed(&ticket, &AppError::internal("db down", json!({})));
            if attempt < 3 {
                assert_eq!(recovery, Some(Recovery::Retry));
                effect = s.handle(UserAction::Retry);
            } else {
                assert_eq!(recovery, Some(Recovery::Fallback));
                effect = Effect::None;
            }
        }
        assert_eq!(effect, Effect::None);

        assert!(!offers(&s, ActionKind::Retry));
        assert!(offers(&s, ActionKind::OpenManualFlow));
        assert!(offers(&s, ActionKind::Restart));

        // A fourth bare retry is refused.
        assert_eq!(s.handle(UserAction::Retry), Effect::None);
        assert_eq!(s.handle(UserAction::Commit), Effect::None);
        assert_eq!(s.recovery(), Some(Recovery::Fallback));

        s.handle(UserAction::Restart);
        assert_eq!(s.step(), &Step::Welcome);
        assert_eq!(s.consecutive_errors(), 0);
        assert!(s.recovery().is_none());
    }

    #[test]
    fn test_fatal_commit_offers_restart_only() {
        let mut s = at_review();
        let ticket = commit_ticket(s.handle(UserAction::Commit));
        assert!(s.commit_aborted(&ticket, "link too long"));
        assert_eq!(s.consecutive_errors(), 0);
        assert_eq!(s.recovery(), Some(Recovery::Restart));
        assert!(!offers(&s, ActionKind::Retry));
        assert!(offers(&s, ActionKind::Restart));
    }

    #[test]
    fn test_tag_conflict_is_success() {
        let mut s = at_review();
        s.handle(UserAction::Back);
        assert_eq!(s.step(), &Step::Tags);

        let ticket = match s.handle(enter("Q3 Launch")) {
            Effect::CreateTag { ticket, name } => {
                assert_eq!(name, "Q3 Launch");
                ticket
            }
            other => panic!("unexpected effect {other:?}"),
        };
        assert!(s.tag_registered(
            &ticket,
            "Q3 Launch",
            Err(AppError::conflict("duplicate", json!({})))
        ));
        assert_eq!(s.draft().tags(), ["Q3 Launch"]);
        assert!(s.recovery().is_none());
    }

    #[test]
    fn test_tag_transient_failure_can_be_retried() {
        let mut s = at_review();
        s.handle(UserAction::Back);
        let ticket = match s.handle(enter("Brand")) {
            Effect::CreateTag { ticket, .. } => ticket,
            other => panic!("unexpected effect {other:?}"),
        };
        s.tag_registered(&ticket, "Brand", Err(AppError::internal("timeout", json!({}))));
        assert_eq!(s.recovery(), Some(Recovery::Retry));
        assert_eq!(s.consecutive_errors(), 1);

        let ticket = match s.handle(UserAction::Retry) {
            Effect::CreateTag { ticket, name } => {
                assert_eq!(name, "Brand");
                ticket
            }
            other => panic!("unexpected effect {other:?}"),
        };
        s.tag_registered(&ticket, "Brand", Ok("brand".to_string()));
        assert_eq!(s.consecutive_errors(), 0);
        assert_eq!(s.draft().tags(), ["brand"]);
    }

    #[test]
    fn test_restart_clears_everything() {
        let mut s = at_review();
        s.handle(UserAction::Restart);
        assert_eq!(s.step(), &Step::Welcome);
        assert_eq!(s.draft(), &CampaignDraft::new());
        assert_eq!(s.transcript().len(), 1);
    }

    #[test]
    fn test_retry_without_failure() {
        let mut s = session();
        assert_eq!(s.handle(UserAction::Retry), Effect::None);
        assert_eq!(s.step(), &Step::Welcome);
    }
}
