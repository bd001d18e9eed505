//! User actions accepted by the conversation.

use serde::{Deserialize, Serialize};

/// The kind of action a client can send (or an option can trigger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Select,
    Enter,
    Continue,
    Skip,
    Back,
    Commit,
    Retry,
    Restart,
    /// Leaves the conversation; never sent back to the server.
    OpenManualFlow,
}

/// A user action with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Picks (or un-picks) an offered value.
    Select(String),
    /// Free-text entry; `label` is only meaningful for landing pages.
    Enter { text: String, label: Option<String> },
    Continue,
    Skip,
    Back,
    Commit,
    Retry,
    Restart,
}

impl UserAction {
    /// Transcript text for the user's side of the turn.
    pub fn describe(&self) -> String {
        match self {
            UserAction::Select(value) => value.clone(),
            UserAction::Enter { text, label } => match label {
                Some(label) if !label.trim().is_empty() => format!("{} ({})", text.trim(), label.trim()),
                _ => text.trim().to_string(),
            },
            UserAction::Continue => "Continue".to_string(),
            UserAction::Skip => "Skip".to_string(),
            UserAction::Back => "Back".to_string(),
            UserAction::Commit => "Create links".to_string(),
            UserAction::Retry => "Retry".to_string(),
            UserAction::Restart => "Start over".to_string(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            UserAction::Select(_) => ActionKind::Select,
            UserAction::Enter { .. } => ActionKind::Enter,
            UserAction::Continue => ActionKind::Continue,
            UserAction::Skip => ActionKind::Skip,
            UserAction::Back => ActionKind::Back,
            UserAction::Commit => ActionKind::Commit,
            UserAction::Retry => ActionKind::Retry,
            UserAction::Restart => ActionKind::Restart,
        }
    }
}
