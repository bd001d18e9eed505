//! Per-step prompt rendering.
//!
//! The prompt for a step is a pure function of the step, the draft and the
//! loaded suggestions. Re-rendering after a toggle produces a fresh prompt
//! with updated option states instead of editing earlier messages.

use serde::Serialize;

use crate::domain::entities::{CampaignDraft, GeneratedLink, Suggestion};
use crate::domain::retry_controller::Recovery;

use super::action::ActionKind;
use super::settings::{DEFAULT_SOURCES, FlowSettings, TermSelection, mediums_for_source};
use super::step::Step;
use super::transcript::{OfferedOption, OptionState};
use super::transition::{EXISTING_CAMPAIGN, NEW_CAMPAIGN, START};

/// A failure the user has to resolve before continuing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureNotice {
    pub message: String,
    pub recovery: Recovery,
}

/// What the user is asked on the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub step: Step,
    pub text: String,
    pub options: Vec<OfferedOption>,
    pub accepts_text: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_hint: Option<String>,
}

/// Everything a render needs, borrowed from the session.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub step: &'a Step,
    pub draft: &'a CampaignDraft,
    pub suggestions: &'a [Suggestion],
    pub failure: Option<&'a FailureNotice>,
    pub links: &'a [GeneratedLink],
    pub settings: &'a FlowSettings,
}

pub fn render(ctx: RenderContext<'_>) -> Prompt {
    if let Some(failure) = ctx.failure {
        return Prompt {
            step: ctx.step.clone(),
            text: failure.message.clone(),
            options: recovery_options(failure.recovery, ctx.settings),
            accepts_text: false,
            input_hint: None,
        };
    }

    let draft = ctx.draft;
    let (text, mut options, input_hint) = match ctx.step {
        Step::Welcome => (
            "Hi! I'll help you build tracking links for a campaign. Ready?".to_string(),
            vec![OfferedOption::select(START, "Let's start", OptionState::Available)],
            None,
        ),
        Step::CampaignType => (
            "Are these links for a new campaign or an existing one?".to_string(),
            vec![
                OfferedOption::select(NEW_CAMPAIGN, "New campaign", OptionState::Available),
                OfferedOption::select(
                    EXISTING_CAMPAIGN,
                    "Existing campaign",
                    OptionState::Available,
                ),
            ],
            None,
        ),
        Step::CampaignName => {
            let mut options = Vec::new();
            if !draft.name().is_empty() && !draft.is_existing_campaign() {
                options.push(OfferedOption::control(
                    ActionKind::Continue,
                    format!("Keep \"{}\"", draft.name()),
                ));
            }
            (
                "What should the campaign be called?".to_string(),
                options,
                Some("Letters, numbers, spaces, hyphens and underscores".to_string()),
            )
        }
        Step::ExistingCampaign => {
            let mut options: Vec<OfferedOption> = ctx
                .suggestions
                .iter()
                .map(|s| {
                    let chosen = draft.is_existing_campaign() && draft.name() == s.value;
                    suggestion_option(s, chosen)
                })
                .collect();
            if draft.is_existing_campaign() {
                options.push(OfferedOption::control(ActionKind::Continue, "Continue"));
            }
            let text = if ctx.suggestions.is_empty() {
                "Type the name of the campaign to add links to.".to_string()
            } else {
                "Which campaign should the links be added to?".to_string()
            };
            (text, options, Some("Campaign name".to_string()))
        }
        Step::LandingPages => {
            let mut options: Vec<OfferedOption> = draft
                .landing_pages()
                .iter()
                .map(|page| OfferedOption::select(&page.url, &page.label, OptionState::Chosen))
                .collect();
            options.extend(
                ctx.suggestions
                    .iter()
                    .filter(|s| !draft.has_landing_page(&s.value))
                    .map(|s| suggestion_option(s, false)),
            );
            if !draft.landing_pages().is_empty() {
                options.push(OfferedOption::control(ActionKind::Continue, "Continue"));
            }
            let text = if draft.landing_pages().is_empty() {
                "Which landing pages should the links point to?".to_string()
            } else {
                format!(
                    "{} landing page(s) added. Add another or continue.",
                    draft.landing_pages().len()
                )
            };
            (
                text,
                options,
                Some("https://example.com/page, with an optional label".to_string()),
            )
        }
        Step::Sources => {
            let mut options = catalogue_options(
                DEFAULT_SOURCES.iter().copied(),
                draft.sources(),
                |value| draft.has_source(value),
            );
            if !draft.sources().is_empty() {
                options.push(OfferedOption::control(ActionKind::Continue, "Continue"));
            }
            (
                "Where will the links be shared? Pick every source that applies.".to_string(),
                options,
                Some("Custom source".to_string()),
            )
        }
        Step::Mediums { source } => {
            let mut options = catalogue_options(
                mediums_for_source(source).iter().copied(),
                draft.mediums_for(source),
                |value| draft.has_medium(source, value),
            );
            if !draft.mediums_for(source).is_empty() {
                options.push(OfferedOption::control(ActionKind::Continue, "Continue"));
            }
            (
                format!("Which mediums will you use on {source}?"),
                options,
                Some("Custom medium".to_string()),
            )
        }
        Step::Content { source, medium } => {
            let selected = draft.content_for(source, medium);
            let mut options = suggestion_options(ctx.suggestions, selected, |value| {
                selected.iter().any(|c| c == value)
            });
            if !selected.is_empty() {
                options.push(OfferedOption::control(ActionKind::Continue, "Continue"));
            }
            options.push(OfferedOption::control(ActionKind::Skip, "Skip"));
            (
                format!("Any content variants for {source} / {medium}? e.g. the ad or creative name."),
                options,
                Some("Content value".to_string()),
            )
        }
        Step::Terms => {
            let selected = draft.all_terms();
            let mut options = suggestion_options(ctx.suggestions, &selected, |value| {
                draft.term_on_all_pairs(value)
            });
            if !selected.is_empty() {
                options.push(OfferedOption::control(ActionKind::Continue, "Continue"));
            }
            options.push(OfferedOption::control(ActionKind::Skip, "Skip"));
            let text = match ctx.settings.term_selection {
                TermSelection::Multiple => {
                    "Add tracking terms? Each term applies to every source and medium."
                }
                TermSelection::Single => {
                    "Add a tracking term? It applies to every source and medium."
                }
            };
            (text.to_string(), options, Some("Term".to_string()))
        }
        Step::Tags => {
            let mut options = suggestion_options(ctx.suggestions, draft.tags(), |value| {
                draft.has_tag(value)
            });
            if !draft.tags().is_empty() {
                options.push(OfferedOption::control(ActionKind::Continue, "Continue"));
            }
            options.push(OfferedOption::control(ActionKind::Skip, "Skip"));
            (
                "Would you like to tag these links?".to_string(),
                options,
                Some("New tag".to_string()),
            )
        }
        Step::Review => {
            let count = draft.combination_count();
            let mut options = Vec::new();
            if count > 0 {
                options.push(OfferedOption::control(
                    ActionKind::Commit,
                    format!("Create {count} link(s)"),
                ));
            }
            (review_summary(draft), options, None)
        }
        Step::Commit => (
            format!("Creating {} link(s)...", draft.combination_count()),
            Vec::new(),
            None,
        ),
        Step::Complete => {
            let mut lines = vec![format!("Done! Created {} tracking link(s):", ctx.links.len())];
            lines.extend(ctx.links.iter().map(|link| link.full_tracking_url.clone()));
            (lines.join("\n"), Vec::new(), None)
        }
    };

    if ctx.step.allows_back() {
        options.push(OfferedOption::control(ActionKind::Back, "Back"));
    }
    if !matches!(ctx.step, Step::Welcome | Step::Commit) {
        options.push(OfferedOption::control(ActionKind::Restart, "Start over"));
    }

    Prompt {
        step: ctx.step.clone(),
        text,
        options,
        accepts_text: ctx.step.accepts_text(),
        input_hint,
    }
}

/// Human-readable summary shown on the review step.
pub fn review_summary(draft: &CampaignDraft) -> String {
    let mut lines = Vec::new();

    let kind = if draft.is_existing_campaign() {
        "existing"
    } else {
        "new"
    };
    lines.push(format!("Campaign: {} ({kind})", draft.name()));

    lines.push(format!("Landing pages ({}):", draft.landing_pages().len()));
    for page in draft.landing_pages() {
        lines.push(format!("  - {} ({})", page.label, page.url));
    }

    lines.push("Sources:".to_string());
    for source in draft.sources() {
        lines.push(format!("  - {source}: {}", draft.mediums_for(source).join(", ")));
    }

    for (source, medium) in draft.pairs() {
        let content = draft.content_for(&source, &medium);
        if !content.is_empty() {
            lines.push(format!("Content {source}/{medium}: {}", content.join(", ")));
        }
    }

    let terms = draft.all_terms();
    if !terms.is_empty() {
        lines.push(format!("Terms: {}", terms.join(", ")));
    }
    if !draft.tags().is_empty() {
        lines.push(format!("Tags: {}", draft.tags().join(", ")));
    }

    lines.push(format!(
        "This will create {} tracking link(s).",
        draft.combination_count()
    ));
    lines.join("\n")
}

fn recovery_options(recovery: Recovery, settings: &FlowSettings) -> Vec<OfferedOption> {
    match recovery {
        Recovery::Retry => vec![OfferedOption::control(ActionKind::Retry, "Try again")],
        Recovery::Fallback => vec![
            OfferedOption::link("Create links manually", &settings.manual_flow_url),
            OfferedOption::control(ActionKind::Restart, "Start over"),
        ],
        Recovery::Restart => vec![OfferedOption::control(ActionKind::Restart, "Start over")],
    }
}

fn suggestion_option(suggestion: &Suggestion, chosen: bool) -> OfferedOption {
    let state = if chosen {
        OptionState::Chosen
    } else {
        OptionState::Available
    };
    OfferedOption::select(&suggestion.value, &suggestion.label, state)
        .with_description(suggestion.description.clone())
}

/// Catalogue entries first, then custom selections not in the catalogue.
fn catalogue_options<'a>(
    catalogue: impl Iterator<Item = &'a str>,
    selected: &[String],
    is_chosen: impl Fn(&str) -> bool,
) -> Vec<OfferedOption> {
    let mut values: Vec<String> = catalogue.map(str::to_string).collect();
    for value in selected {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }

    values
        .iter()
        .map(|value| {
            let state = if is_chosen(value.as_str()) {
                OptionState::Chosen
            } else {
                OptionState::Available
            };
            OfferedOption::select(value, value, state)
        })
        .collect()
}

/// Suggestions first, then selected values that no suggestion covers.
fn suggestion_options(
    suggestions: &[Suggestion],
    selected: &[String],
    is_chosen: impl Fn(&str) -> bool,
) -> Vec<OfferedOption> {
    let mut options: Vec<OfferedOption> = suggestions
        .iter()
        .map(|s| suggestion_option(s, is_chosen(s.value.as_str())))
        .collect();

    for value in selected {
        let covered = suggestions
            .iter()
            .any(|s| s.value.eq_ignore_ascii_case(value));
        if !covered {
            options.push(OfferedOption::select(value, value, OptionState::Chosen));
        }
    }
    options
}
