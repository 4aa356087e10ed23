//! The closed navigation error taxonomy
//!
//! Every failure the engine can surface is one of these kinds; nothing
//! escapes as an unclassified error. The recovery coordinator keys its
//! feedback and strategy tables off this enum so the compiler checks both
//! tables stay exhaustive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of every navigation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationErrorKind {
    /// Identifier is unknown to the pool
    #[error("challenge not found")]
    ChallengeNotFound,
    /// The eligible set is empty
    #[error("no eligible challenges are available")]
    NoAvailableChallenges,
    /// Internal selection inconsistency
    #[error("navigation loop failure")]
    NavigationLoopFailure,
    /// Known challenge, but not currently eligible for this viewer
    #[error("permission denied")]
    PermissionDenied,
    /// The session is no longer valid
    #[error("session expired")]
    SessionExpired,
    /// The navigation context was lost or could not be restored
    #[error("navigation context lost")]
    ContextLoss,
    /// In-flight form data was lost
    #[error("form data lost")]
    FormDataLoss,
    /// The address bar fell out of sync with the context
    #[error("url sync failure")]
    UrlSyncFailure,
    /// Challenge content failed to load
    #[error("content load failure")]
    ContentLoadFailure,
    /// A context snapshot could not be written
    #[error("state preservation failure")]
    StatePreservationFailure,
    /// Navigation was entered through an invalid route
    #[error("invalid entry point")]
    InvalidEntryPoint,
}

impl NavigationErrorKind {
    /// Stable wire code for this kind
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            Self::NoAvailableChallenges => "NO_AVAILABLE_CHALLENGES",
            Self::NavigationLoopFailure => "NAVIGATION_LOOP_FAILURE",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::ContextLoss => "CONTEXT_LOSS",
            Self::FormDataLoss => "FORM_DATA_LOSS",
            Self::UrlSyncFailure => "URL_SYNC_FAILURE",
            Self::ContentLoadFailure => "CONTENT_LOAD_FAILURE",
            Self::StatePreservationFailure => "STATE_PRESERVATION_FAILURE",
            Self::InvalidEntryPoint => "INVALID_ENTRY_POINT",
        }
    }

    /// Whether retrying this failure can plausibly succeed
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::NavigationLoopFailure
                | Self::SessionExpired
                | Self::ContextLoss
                | Self::FormDataLoss
                | Self::UrlSyncFailure
                | Self::ContentLoadFailure
                | Self::StatePreservationFailure
        )
    }

    /// Suggested wait before a retry, for UI pacing only
    #[must_use]
    pub const fn suggested_wait_ms(self) -> Option<u64> {
        match self {
            Self::NavigationLoopFailure => Some(1000),
            Self::SessionExpired => Some(2000),
            Self::ContextLoss => Some(1500),
            Self::FormDataLoss => Some(1000),
            Self::UrlSyncFailure => Some(500),
            Self::ContentLoadFailure => Some(2000),
            Self::StatePreservationFailure => Some(1500),
            Self::ChallengeNotFound
            | Self::NoAvailableChallenges
            | Self::PermissionDenied
            | Self::InvalidEntryPoint => None,
        }
    }

    /// All kinds, in declaration order
    #[must_use]
    pub const fn all() -> [Self; 11] {
        [
            Self::ChallengeNotFound,
            Self::NoAvailableChallenges,
            Self::NavigationLoopFailure,
            Self::PermissionDenied,
            Self::SessionExpired,
            Self::ContextLoss,
            Self::FormDataLoss,
            Self::UrlSyncFailure,
            Self::ContentLoadFailure,
            Self::StatePreservationFailure,
            Self::InvalidEntryPoint,
        ]
    }
}

/// A classified selection failure with human-readable detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {detail}")]
pub struct SelectionError {
    /// Classification
    pub kind: NavigationErrorKind,
    /// What went wrong, for logs and technical detail
    pub detail: String,
}

impl SelectionError {
    /// Create a classified selection error
    #[must_use]
    pub fn new(kind: NavigationErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// The eligible set is empty
    #[must_use]
    pub fn no_available() -> Self {
        Self::new(
            NavigationErrorKind::NoAvailableChallenges,
            "eligible challenge list is empty",
        )
    }

    /// An identifier is unknown to the pool
    #[must_use]
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::new(
            NavigationErrorKind::ChallengeNotFound,
            format!("challenge '{id}' is not in the pool"),
        )
    }

    /// A known identifier is not eligible for this viewer
    #[must_use]
    pub fn permission_denied(id: impl std::fmt::Display) -> Self {
        Self::new(
            NavigationErrorKind::PermissionDenied,
            format!("challenge '{id}' is not currently accessible"),
        )
    }

    /// Internal selection inconsistency
    #[must_use]
    pub fn loop_failure(detail: impl Into<String>) -> Self {
        Self::new(NavigationErrorKind::NavigationLoopFailure, detail)
    }
}
