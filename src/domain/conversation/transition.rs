//! Step transition rules.
//!
//! [`transition`] applies one user action to the draft and tells the session
//! what to do next. It performs no I/O and never touches the transcript, so it
//! can be driven step by step in tests.

use crate::domain::entities::{CampaignDraft, Suggestion, Toggled};
use crate::utils::sanitize::{FieldKind, clean_field, validate_field};
use crate::utils::url_validator::{default_label, validate_url};

use super::action::UserAction;
use super::settings::{FlowSettings, TermSelection};
use super::step::Step;

/// Values recognised on the welcome and campaign-type steps.
pub const START: &str = "start";
pub const NEW_CAMPAIGN: &str = "new";
pub const EXISTING_CAMPAIGN: &str = "existing";

/// Outcome of applying an action to the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Move forward to a new step.
    Advance(Step),
    /// Return to the previous step.
    Back,
    /// The draft changed; re-render the step, optionally with a note first.
    Stay(Option<String>),
    /// Nothing changed; tell the user why and re-render.
    Reprompt(String),
    /// Register a typed tag with the persistence gateway before attaching it.
    CreateTag(String),
    /// Start the commit batch.
    Commit,
}

/// Read-only inputs to a transition besides the draft.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub settings: &'a FlowSettings,
    /// Suggestions currently offered on this step.
    pub suggestions: &'a [Suggestion],
}

/// Applies `action` on `step`, mutating `draft` through its own operations.
pub fn transition(
    step: &Step,
    draft: &mut CampaignDraft,
    action: &UserAction,
    ctx: TransitionContext<'_>,
) -> Directive {
    if let UserAction::Back = action {
        return if step.allows_back() {
            Directive::Back
        } else {
            unavailable()
        };
    }

    match step {
        Step::Welcome => match action {
            UserAction::Continue => Directive::Advance(Step::CampaignType),
            UserAction::Select(value) if value == START => Directive::Advance(Step::CampaignType),
            _ => unavailable(),
        },
        Step::CampaignType => match action {
            UserAction::Select(value) if value == NEW_CAMPAIGN => {
                Directive::Advance(Step::CampaignName)
            }
            UserAction::Select(value) if value == EXISTING_CAMPAIGN => {
                Directive::Advance(Step::ExistingCampaign)
            }
            _ => unavailable(),
        },
        Step::CampaignName => campaign_name(draft, action),
        Step::ExistingCampaign => existing_campaign(draft, action),
        Step::LandingPages => landing_pages(draft, action),
        Step::Sources => sources(draft, action),
        Step::Mediums { source } => mediums(draft, source, action),
        Step::Content { source, medium } => content(draft, source, medium, action),
        Step::Terms => terms(draft, action, ctx.settings),
        Step::Tags => tags(draft, action, ctx.suggestions),
        Step::Review => match action {
            UserAction::Commit if draft.combination_count() == 0 => Directive::Reprompt(
                "There are no links to create yet. Go back and add a landing page and at least one source with a medium."
                    .to_string(),
            ),
            UserAction::Commit => Directive::Commit,
            _ => unavailable(),
        },
        Step::Commit => Directive::Reprompt("Your links are being created, please wait.".to_string()),
        Step::Complete => Directive::Reprompt(
            "All done. Start over to build another set of links.".to_string(),
        ),
    }
}

/// The step after the mediums loop finishes for `current`.
pub fn after_mediums(draft: &CampaignDraft, current: &str) -> Step {
    let sources = draft.sources();
    let next = sources
        .iter()
        .position(|s| s == current)
        .and_then(|pos| sources.get(pos + 1));

    match next {
        Some(source) => Step::Mediums {
            source: source.clone(),
        },
        None => first_content_step(draft),
    }
}

/// The step after the content loop finishes for the given pair.
pub fn after_content(draft: &CampaignDraft, source: &str, medium: &str) -> Step {
    let pairs = draft.pairs();
    let next = pairs
        .iter()
        .position(|(s, m)| s == source && m == medium)
        .and_then(|pos| pairs.get(pos + 1));

    match next {
        Some((source, medium)) => Step::Content {
            source: source.clone(),
            medium: medium.clone(),
        },
        None => Step::Terms,
    }
}

fn first_content_step(draft: &CampaignDraft) -> Step {
    match draft.pairs().into_iter().next() {
        Some((source, medium)) => Step::Content { source, medium },
        None => Step::Terms,
    }
}

fn campaign_name(draft: &mut CampaignDraft, action: &UserAction) -> Directive {
    match action {
        UserAction::Enter { text, .. } | UserAction::Select(text) => {
            match clean_field(FieldKind::Campaign, text) {
                Ok(name) => {
                    draft.set_campaign(name);
                    Directive::Advance(Step::LandingPages)
                }
                Err(e) => Directive::Reprompt(e.to_string()),
            }
        }
        UserAction::Continue if !draft.name().is_empty() && !draft.is_existing_campaign() => {
            Directive::Advance(Step::LandingPages)
        }
        UserAction::Continue => Directive::Reprompt("Please enter a campaign name.".to_string()),
        _ => unavailable(),
    }
}

fn existing_campaign(draft: &mut CampaignDraft, action: &UserAction) -> Directive {
    match action {
        UserAction::Enter { text, .. } | UserAction::Select(text) => {
            match clean_field(FieldKind::Campaign, text) {
                Ok(name) => {
                    draft.use_existing_campaign(name);
                    Directive::Advance(Step::LandingPages)
                }
                Err(e) => Directive::Reprompt(e.to_string()),
            }
        }
        UserAction::Continue if draft.is_existing_campaign() => {
            Directive::Advance(Step::LandingPages)
        }
        UserAction::Continue => {
            Directive::Reprompt("Please pick or type the campaign to add links to.".to_string())
        }
        _ => unavailable(),
    }
}

fn landing_pages(draft: &mut CampaignDraft, action: &UserAction) -> Directive {
    let (raw, label) = match action {
        UserAction::Enter { text, label } => (text, label.as_deref()),
        UserAction::Select(url) => (url, None),
        UserAction::Continue if draft.landing_pages().is_empty() => {
            return Directive::Reprompt("Add at least one landing page to continue.".to_string());
        }
        UserAction::Continue => return Directive::Advance(Step::Sources),
        _ => return unavailable(),
    };

    let url = match validate_url(raw) {
        Ok(url) => url,
        Err(e) => return Directive::Reprompt(e.to_string()),
    };

    let label = match label.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => default_label(&url),
    };

    if draft.add_landing_page(url.clone(), label) {
        Directive::Stay(Some(format!("Added {url}.")))
    } else {
        Directive::Reprompt(format!("{url} is already in this campaign."))
    }
}

fn sources(draft: &mut CampaignDraft, action: &UserAction) -> Directive {
    match action {
        UserAction::Select(value) => match clean_field(FieldKind::Source, value) {
            Ok(source) => toggled(draft.toggle_source(&source).map_err(|e| e.to_string()), &source),
            Err(e) => Directive::Reprompt(e.to_string()),
        },
        UserAction::Enter { text, .. } => match clean_field(FieldKind::Source, text) {
            Ok(source) if draft.has_source(&source) => {
                Directive::Reprompt(format!("{source} is already selected."))
            }
            Ok(source) => toggled(draft.toggle_source(&source).map_err(|e| e.to_string()), &source),
            Err(e) => Directive::Reprompt(e.to_string()),
        },
        UserAction::Continue => match draft.sources().first() {
            Some(first) => Directive::Advance(Step::Mediums {
                source: first.clone(),
            }),
            None => Directive::Reprompt("Select at least one source to continue.".to_string()),
        },
        _ => unavailable(),
    }
}

fn mediums(draft: &mut CampaignDraft, source: &str, action: &UserAction) -> Directive {
    match action {
        UserAction::Select(value) => match clean_field(FieldKind::Medium, value) {
            Ok(medium) => toggled(
                draft.toggle_medium(source, &medium).map_err(|e| e.to_string()),
                &medium,
            ),
            Err(e) => Directive::Reprompt(e.to_string()),
        },
        UserAction::Enter { text, .. } => match clean_field(FieldKind::Medium, text) {
            Ok(medium) if draft.has_medium(source, &medium) => {
                Directive::Reprompt(format!("{medium} is already selected for {source}."))
            }
            Ok(medium) => toggled(
                draft.toggle_medium(source, &medium).map_err(|e| e.to_string()),
                &medium,
            ),
            Err(e) => Directive::Reprompt(e.to_string()),
        },
        UserAction::Continue if draft.mediums_for(source).is_empty() => {
            Directive::Reprompt(format!("Select at least one medium for {source}."))
        }
        UserAction::Continue => Directive::Advance(after_mediums(draft, source)),
        _ => unavailable(),
    }
}

fn content(draft: &mut CampaignDraft, source: &str, medium: &str, action: &UserAction) -> Directive {
    match action {
        UserAction::Select(text) | UserAction::Enter { text, .. } => {
            match clean_field(FieldKind::Content, text) {
                Ok(value) if value.is_empty() => {
                    Directive::Reprompt("Please enter a content value, or skip.".to_string())
                }
                Ok(value) => toggled(
                    draft
                        .toggle_content(source, medium, &value)
                        .map_err(|e| e.to_string()),
                    &value,
                ),
                Err(e) => Directive::Reprompt(e.to_string()),
            }
        }
        UserAction::Continue | UserAction::Skip => {
            Directive::Advance(after_content(draft, source, medium))
        }
        _ => unavailable(),
    }
}

fn terms(draft: &mut CampaignDraft, action: &UserAction, settings: &FlowSettings) -> Directive {
    match action {
        UserAction::Select(text) | UserAction::Enter { text, .. } => {
            match clean_field(FieldKind::Term, text) {
                Ok(value) if value.is_empty() => {
                    Directive::Reprompt("Please enter a term, or skip.".to_string())
                }
                Ok(value) => {
                    let result = match settings.term_selection {
                        TermSelection::Multiple => draft.toggle_term_on_all_pairs(&value),
                        TermSelection::Single => draft.replace_term_on_all_pairs(&value),
                    };
                    toggled(result.map_err(|e| e.to_string()), &value)
                }
                Err(e) => Directive::Reprompt(e.to_string()),
            }
        }
        UserAction::Continue | UserAction::Skip => Directive::Advance(Step::Tags),
        _ => unavailable(),
    }
}

fn tags(draft: &mut CampaignDraft, action: &UserAction, suggestions: &[Suggestion]) -> Directive {
    match action {
        UserAction::Select(name) if draft.has_tag(name) => {
            draft.detach_tag(name);
            Directive::Stay(Some(format!("Removed tag {}.", name.trim())))
        }
        UserAction::Select(name) if suggestions.iter().any(|s| s.value == *name) => {
            draft.attach_tag(name);
            Directive::Stay(Some(format!("Tagged with {}.", name.trim())))
        }
        UserAction::Select(name) | UserAction::Enter { text: name, .. } => {
            match validate_field(FieldKind::Tag, name) {
                Ok(()) => Directive::CreateTag(collapse_whitespace(name)),
                Err(e) => Directive::Reprompt(e.to_string()),
            }
        }
        UserAction::Continue | UserAction::Skip => Directive::Advance(Step::Review),
        _ => unavailable(),
    }
}

fn toggled(result: Result<Toggled, String>, value: &str) -> Directive {
    match result {
        Ok(Toggled::Added) => Directive::Stay(Some(format!("Added {value}."))),
        Ok(Toggled::Removed) => Directive::Stay(Some(format!("Removed {value}."))),
        Err(message) => Directive::Reprompt(message),
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn unavailable() -> Directive {
    Directive::Reprompt("That option isn't available here.".to_string())
}
