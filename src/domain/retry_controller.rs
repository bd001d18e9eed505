//! Consecutive-failure accounting for gateway calls.
//!
//! The controller only counts; the session decides what to render from the
//! [`Recovery`] it returns.

use serde::Serialize;

use crate::error::AppError;

/// Default number of consecutive counted failures before falling back.
pub const DEFAULT_FALLBACK_THRESHOLD: u32 = 3;

/// How a failed gateway call should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Duplicate key: the resource exists, proceed as if the call succeeded.
    SuccessEquivalent,
    /// Rejected input; re-prompt without counting.
    Input,
    /// Network or storage trouble; counted.
    Transient,
    /// Structurally invalid request; retrying cannot help.
    Fatal,
}

/// The affordance offered after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// Re-run the failed operation.
    Retry,
    /// Too many consecutive failures: manual flow or restart.
    Fallback,
    /// Only a restart can help.
    Restart,
}

/// Maps a gateway error to the way the conversation handles it.
pub fn classify(error: &AppError) -> FailureKind {
    match error {
        AppError::Conflict { .. } => FailureKind::SuccessEquivalent,
        AppError::Validation { .. } => FailureKind::Input,
        AppError::NotFound { .. } | AppError::Internal { .. } => FailureKind::Transient,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryController {
    consecutive_errors: u32,
    threshold: u32,
}

impl Default for RetryController {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_THRESHOLD)
    }
}

impl RetryController {
    /// A threshold of zero is treated as one.
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive_errors: 0,
            threshold: threshold.max(1),
        }
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
    }

    /// Counts a transient failure and returns the affordance to show.
    pub fn record_failure(&mut self) -> Recovery {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        if self.is_exhausted() {
            Recovery::Fallback
        } else {
            Recovery::Retry
        }
    }

    /// Applies a classified failure.
    ///
    /// Returns the affordance to show, or `None` when the conversation simply
    /// carries on (success-equivalent) or re-prompts (input).
    pub fn record(&mut self, kind: FailureKind) -> Option<Recovery> {
        match kind {
            FailureKind::SuccessEquivalent => {
                self.record_success();
                None
            }
            FailureKind::Input => None,
            FailureKind::Transient => Some(self.record_failure()),
            FailureKind::Fatal => Some(Recovery::Restart),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.consecutive_errors >= self.threshold
    }

    pub fn reset(&mut self) {
        self.consecutive_errors = 0;
    }
}
