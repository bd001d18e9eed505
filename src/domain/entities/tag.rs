//! Organizational tag entities.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A tag known to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(id: i64, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }

    /// Case-insensitive name comparison, the uniqueness rule for tags.
    pub fn same_name(&self, other: &str) -> bool {
        self.name.trim().to_lowercase() == other.trim().to_lowercase()
    }
}

/// Input data for creating a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub user_id: String,
    pub account_id: String,
}

/// Result of registering a tag.
///
/// Both variants are success: a concurrent session may have created the same
/// tag between our lookup and our insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    Created(Tag),
    AlreadyExists(Tag),
}

impl TagOutcome {
    pub fn tag(&self) -> &Tag {
        match self {
            TagOutcome::Created(tag) | TagOutcome::AlreadyExists(tag) => tag,
        }
    }

    pub fn into_tag(self) -> Tag {
        match self {
            TagOutcome::Created(tag) | TagOutcome::AlreadyExists(tag) => tag,
        }
    }
}
