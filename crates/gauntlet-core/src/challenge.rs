//! Challenge records and per-challenge eligibility state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Attempts granted to a fresh challenge before it is exhausted
pub const DEFAULT_ATTEMPTS_REMAINING: u32 = 10;

/// Unique challenge identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChallengeId(String);

impl ChallengeId {
    /// Create a new challenge ID
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A challenge as supplied by the host application.
///
/// The engine treats the payload as opaque; only the identifier and the
/// creator participate in selection. Navigation order follows the order
/// records were supplied in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeRecord {
    /// Unique identifier
    pub id: ChallengeId,
    /// Display title
    pub title: String,
    /// Image URLs shown with the puzzle
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Identifier of the viewer who created this challenge, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Opaque application payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl ChallengeRecord {
    /// Create a new challenge record
    #[must_use]
    pub fn new(id: ChallengeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            image_urls: Vec::new(),
            creator: None,
            payload: None,
        }
    }

    /// Set the creator for this record
    #[must_use]
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Set the opaque payload for this record
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Lifecycle status of a challenge for the current player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChallengeStatus {
    /// Playable
    Active,
    /// Solved by the player
    Completed,
    /// Abandoned by the player
    GivenUp,
    /// Attempts exhausted
    GameOver,
}

impl ChallengeStatus {
    /// Check if this status ends play for the challenge
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::GivenUp | Self::GameOver)
    }
}

/// Player progress on a single challenge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    /// Whether the player solved it
    pub is_completed: bool,
    /// Hints consumed
    pub hints_used: u32,
    /// Guesses made
    pub attempts_made: u32,
    /// Final score, once scored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

/// Eligibility state tracked per known challenge.
///
/// Created lazily the first time a challenge is touched; mutated only
/// through [`StateUpdate`]; cleared in bulk on reset, never individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityState {
    /// Current status
    pub status: ChallengeStatus,
    /// Attempts left before the challenge is exhausted
    pub attempts_remaining: u32,
    /// Last time this state was touched
    pub last_accessed: DateTime<Utc>,
    /// Player progress
    pub progress: PlayerProgress,
}

impl Default for EligibilityState {
    fn default() -> Self {
        Self {
            status: ChallengeStatus::Active,
            attempts_remaining: DEFAULT_ATTEMPTS_REMAINING,
            last_accessed: Utc::now(),
            progress: PlayerProgress::default(),
        }
    }
}

impl EligibilityState {
    /// Merge a partial update into this state, stamping `last_accessed`
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(attempts) = update.attempts_remaining {
            self.attempts_remaining = attempts;
        }
        if let Some(progress) = update.progress {
            self.progress = progress;
        }
        self.last_accessed = Utc::now();
    }
}

/// Partial update to an [`EligibilityState`]; absent fields are untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ChallengeStatus>,
    /// New attempts-remaining count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_remaining: Option<u32>,
    /// New progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<PlayerProgress>,
}

impl StateUpdate {
    /// Update that only changes the status
    #[must_use]
    pub const fn status(status: ChallengeStatus) -> Self {
        Self {
            status: Some(status),
            attempts_remaining: None,
            progress: None,
        }
    }

    /// Update that only changes the attempts-remaining count
    #[must_use]
    pub const fn attempts_remaining(attempts: u32) -> Self {
        Self {
            status: None,
            attempts_remaining: Some(attempts),
            progress: None,
        }
    }

    /// Set the progress carried by this update
    #[must_use]
    pub fn with_progress(mut self, progress: PlayerProgress) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// An attempt the viewer made on some challenge.
///
/// Opaque to the engine; passed through to the ownership filter so the
/// exclusion rule can evolve in application code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Challenge the attempt was made on
    pub challenge_id: ChallengeId,
    /// Whether the attempt solved the challenge
    pub solved: bool,
    /// When the attempt happened
    pub attempted_at: DateTime<Utc>,
}
