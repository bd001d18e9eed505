//! DTOs for the conversation endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::domain::conversation::{
    ActionKind, Owner, Prompt, SessionSnapshot, Step, Transcript, UserAction,
};
use crate::domain::entities::{CampaignDraft, GeneratedLink};
use crate::domain::retry_controller::Recovery;
use crate::error::AppError;

/// Request to start a conversation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,

    #[validate(length(min = 1, max = 100))]
    pub account_id: String,
}

impl From<CreateSessionRequest> for Owner {
    fn from(request: CreateSessionRequest) -> Self {
        Owner {
            user_id: request.user_id.trim().to_string(),
            account_id: request.account_id.trim().to_string(),
        }
    }
}

/// One user action.
///
/// ```json
/// { "action": "enter", "value": "https://shop.example.com", "label": "Shop" }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct ActionRequest {
    pub action: ActionKind,

    #[validate(length(max = 2048))]
    pub value: Option<String>,

    #[validate(length(max = 200))]
    pub label: Option<String>,
}

impl TryFrom<ActionRequest> for UserAction {
    type Error = AppError;

    fn try_from(request: ActionRequest) -> Result<Self, Self::Error> {
        let missing_value = || {
            AppError::bad_request(
                "This action requires a value",
                json!({ "field": "value", "action": request.action }),
            )
        };

        let action = match request.action {
            ActionKind::Select => UserAction::Select(request.value.clone().ok_or_else(missing_value)?),
            ActionKind::Enter => UserAction::Enter {
                text: request.value.clone().ok_or_else(missing_value)?,
                label: request.label.clone(),
            },
            ActionKind::Continue => UserAction::Continue,
            ActionKind::Skip => UserAction::Skip,
            ActionKind::Back => UserAction::Back,
            ActionKind::Commit => UserAction::Commit,
            ActionKind::Retry => UserAction::Retry,
            ActionKind::Restart => UserAction::Restart,
            ActionKind::OpenManualFlow => {
                return Err(AppError::bad_request(
                    "The manual creation flow is opened by the client",
                    json!({ "action": request.action }),
                ));
            }
        };

        Ok(action)
    }
}

/// A session as returned by every conversation endpoint.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub user_id: String,
    pub account_id: String,
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

impl From<SessionSnapshot> for SessionView {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            id: snapshot.id,
            user_id: snapshot.owner.user_id,
            account_id: snapshot.owner.account_id,
            step: snapshot.step,
            prompt: snapshot.prompt,
            transcript: snapshot.transcript,
            draft: snapshot.draft,
            combination_count: snapshot.combination_count,
            recovery: snapshot.recovery,
            consecutive_errors: snapshot.consecutive_errors,
            links: snapshot.links,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(action: ActionKind, value: Option<&str>) -> ActionRequest {
        ActionRequest {
            action,
            value: value.map(str::to_string),
            label: None,
        }
    }

    #[test]
    fn test_select_requires_value() {
        let result = UserAction::try_from(request(ActionKind::Select, None));
        assert!(matches!(result, Err(AppError::Validation { .. })));

        let action = UserAction::try_from(request(ActionKind::Select, Some("google"))).unwrap();
        assert_eq!(action, UserAction::Select("google".to_string()));
    }

    #[test]
    fn test_enter_keeps_label() {
        let action = UserAction::try_from(ActionRequest {
            action: ActionKind::Enter,
            value: Some("https://x.com".to_string()),
            label: Some("Home".to_string()),
        })
        .unwrap();

        assert_eq!(
            action,
            UserAction::Enter {
                text: "https://x.com".to_string(),
                label: Some("Home".to_string())
            }
        );
    }

    #[test]
    fn test_control_actions_ignore_value() {
        let action = UserAction::try_from(request(ActionKind::Continue, Some("x"))).unwrap();
        assert_eq!(action, UserAction::Continue);
    }

    #[test]
    fn test_manual_flow_is_rejected() {
        assert!(UserAction::try_from(request(ActionKind::OpenManualFlow, None)).is_err());
    }

    #[test]
    fn test_action_request_parses_snake_case() {
        let parsed: ActionRequest =
            serde_json::from_str(r#"{"action":"restart"}"#).unwrap();
        assert_eq!(parsed.action, ActionKind::Restart);
        assert!(serde_json::from_str::<ActionRequest>(r#"{"action":"jump"}"#).is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let blank = CreateSessionRequest {
            user_id: String::new(),
            account_id: "acct".to_string(),
        };
        assert!(blank.validate().is_err());
    }
}
