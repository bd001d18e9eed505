//! Tag registration service.

use std::sync::Arc;

use crate::domain::entities::{NewTag, Tag, TagOutcome};
use crate::domain::repositories::TagRepository;
use crate::error::AppError;
use serde_json::json;

/// Registers account tags, treating an existing tag as success.
///
/// The repository is authoritative: names are looked up case-insensitively
/// before inserting, and a conflict on insert (another session won the race)
/// is resolved by re-fetching the winner.
pub struct TagService<R: TagRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: TagRepository + ?Sized> TagService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists the account's tags.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list(&self, account_id: &str) -> Result<Vec<Tag>, AppError> {
        self.repository.list(account_id).await
    }

    /// Creates a tag, or returns the existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name is blank.
    /// Returns [`AppError::Internal`] on database errors, or if a conflicting
    /// tag cannot be found again.
    pub async fn register(&self, new_tag: NewTag) -> Result<TagOutcome, AppError> {
        let name = new_tag.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request(
                "Tag name must not be empty",
                json!({ "field": "name" }),
            ));
        }

        if let Some(existing) = self
            .repository
            .find_by_name(&new_tag.account_id, &name)
            .await?
        {
            return Ok(TagOutcome::AlreadyExists(existing));
        }

        let account_id = new_tag.account_id.clone();
        match self.repository.create(NewTag { name: name.clone(), ..new_tag }).await {
            Ok(tag) => {
                tracing::info!(tag = %tag.name, account_id = %account_id, "Tag created");
                Ok(TagOutcome::Created(tag))
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(tag = %name, "Tag created concurrently, re-fetching");
                self.repository
                    .find_by_name(&account_id, &name)
                    .await?
                    .map(TagOutcome::AlreadyExists)
                    .ok_or_else(|| {
                        AppError::internal(
                            "Tag conflict could not be resolved",
                            json!({ "name": name }),
                        )
                    })
            }
            Err(e) => Err(e),
        }
    }
}
