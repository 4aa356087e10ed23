//! Navigation outcomes returned to the host application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeId;
use crate::error::NavigationErrorKind;

/// How loudly the UI should surface an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational, safe to ignore
    Info,
    /// Something degraded, play can continue
    Warning,
    /// The requested action failed
    Error,
    /// The session itself is in trouble
    Critical,
}

/// Rich error detail attached to failed outcomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Short user-facing title
    pub title: String,
    /// Severity for UI treatment
    pub severity: ErrorSeverity,
    /// Whether technical detail may be shown to the player
    pub show_technical_details: bool,
    /// Auto-dismiss the message after this many milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_dismiss_ms: Option<u64>,
    /// The user action that triggered the failure
    pub user_action: String,
    /// When the failure was classified
    pub timestamp: DateTime<Utc>,
    /// Whether retrying can plausibly succeed
    pub retryable: bool,
    /// Same-kind, same-action failures in the recent window
    pub retry_count: u32,
    /// Suggested wait before retrying, for UI pacing only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_wait_ms: Option<u64>,
}

/// Result of every navigation operation.
///
/// Success carries the resolved challenge; failure carries the classified
/// kind, a user-facing message and ordered fallback action labels. When the
/// recovery coordinator remediated silently, `auto_recovered` is set and
/// `challenge_id` holds the substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationOutcome {
    /// Whether the operation resolved a challenge
    pub success: bool,
    /// Resolved (or recovered) challenge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<ChallengeId>,
    /// Failure classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<NavigationErrorKind>,
    /// User-facing failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Ordered fallback action labels, primary first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_options: Vec<String>,
    /// Rich error detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_context: Option<ErrorContext>,
    /// Set when auto-recovery substituted a working challenge
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_recovered: bool,
    /// Key of the snapshot created by a preserve-context request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_key: Option<String>,
}

impl NavigationOutcome {
    /// Successful navigation to `id`
    #[must_use]
    pub const fn success(id: ChallengeId) -> Self {
        Self {
            success: true,
            challenge_id: Some(id),
            error: None,
            error_message: None,
            fallback_options: Vec::new(),
            error_context: None,
            auto_recovered: false,
            snapshot_key: None,
        }
    }

    /// Successful operation that did not resolve a new challenge
    /// (state updates, context bookkeeping)
    #[must_use]
    pub const fn acknowledged() -> Self {
        Self {
            success: true,
            challenge_id: None,
            error: None,
            error_message: None,
            fallback_options: Vec::new(),
            error_context: None,
            auto_recovered: false,
            snapshot_key: None,
        }
    }

    /// Failed navigation with a classified kind and fallback labels
    #[must_use]
    pub fn failure(
        kind: NavigationErrorKind,
        message: impl Into<String>,
        fallback_options: Vec<String>,
    ) -> Self {
        Self {
            success: false,
            challenge_id: None,
            error: Some(kind),
            error_message: Some(message.into()),
            fallback_options,
            error_context: None,
            auto_recovered: false,
            snapshot_key: None,
        }
    }

    /// Attach rich error detail
    #[must_use]
    pub fn with_error_context(mut self, context: ErrorContext) -> Self {
        self.error_context = Some(context);
        self
    }

    /// Attach the key of a freshly created snapshot
    #[must_use]
    pub fn with_snapshot_key(mut self, key: impl Into<String>) -> Self {
        self.snapshot_key = Some(key.into());
        self
    }

    /// Flip a failed outcome into a silently recovered success.
    ///
    /// The error fields are kept so callers can still see what was
    /// recovered from.
    pub fn mark_recovered(&mut self, id: ChallengeId) {
        self.success = true;
        self.challenge_id = Some(id);
        self.auto_recovered = true;
    }
}
