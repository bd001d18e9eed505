//! Conversation transcript: the append-only record of bot and user turns.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::action::ActionKind;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Bot,
    User,
}

/// Whether an offered option is already part of the draft.
///
/// Chosen options are shown alongside available ones but cannot be activated
/// a second time; selecting one toggles it off where the step supports removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionState {
    Available,
    Chosen,
}

/// A choice presented with a bot turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferedOption {
    /// The action the client sends when this option is picked.
    pub action: ActionKind,
    /// Value sent with `select` actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub label: String,
    pub state: OptionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target for options that leave the conversation (manual creation flow).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl OfferedOption {
    /// A selectable value.
    pub fn select(value: impl Into<String>, label: impl Into<String>, state: OptionState) -> Self {
        Self {
            action: ActionKind::Select,
            value: Some(value.into()),
            label: label.into(),
            state,
            description: None,
            href: None,
        }
    }

    /// A control option such as continue, skip or back.
    pub fn control(action: ActionKind, label: impl Into<String>) -> Self {
        Self {
            action,
            value: None,
            label: label.into(),
            state: OptionState::Available,
            description: None,
            href: None,
        }
    }

    /// A link out of the conversation.
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            action: ActionKind::OpenManualFlow,
            value: None,
            label: label.into(),
            state: OptionState::Available,
            description: None,
            href: Some(href.into()),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn is_chosen(&self) -> bool {
        self.state == OptionState::Chosen
    }
}

/// One entry in the transcript.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub actor: Actor,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offered_options: Option<Vec<OfferedOption>>,
}

/// Ordered, append-only message log for one session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its id.
    pub fn push(
        &mut self,
        actor: Actor,
        text: impl Into<String>,
        offered_options: Option<Vec<OfferedOption>>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.messages.push(Message {
            id,
            actor,
            text: text.into(),
            timestamp: Utc::now(),
            offered_options,
        });
        id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Only used on restart.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_appends_in_order() {
        let mut transcript = Transcript::new();
        let first = transcript.push(Actor::Bot, "Hello", None);
        let second = transcript.push(Actor::User, "Hi", None);

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].id, first);
        assert_eq!(transcript.messages()[1].id, second);
        assert_eq!(transcript.last().unwrap().actor, Actor::User);
        assert!(transcript.messages()[0].timestamp <= transcript.messages()[1].timestamp);
    }

    #[test]
    fn test_clear() {
        let mut transcript = Transcript::new();
        transcript.push(Actor::Bot, "Hello", None);
        transcript.clear();
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_option_serialization() {
        let option = OfferedOption::select("google", "Google", OptionState::Chosen);
        let json = serde_json::to_value(&option).unwrap();
        assert_eq!(json["action"], "select");
        assert_eq!(json["value"], "google");
        assert_eq!(json["state"], "chosen");
        assert!(json.get("href").is_none());

        let link = OfferedOption::link("Manual", "/links/new");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["action"], "open_manual_flow");
        assert_eq!(json["href"], "/links/new");
    }
}
