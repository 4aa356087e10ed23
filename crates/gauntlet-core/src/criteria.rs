//! Eligibility criteria for challenge selection

use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeStatus;

/// Configuration for the eligibility filter.
///
/// Callers usually rely on `Default` and override per call when a screen
/// needs different rules (e.g. a review mode that includes completed
/// challenges).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    /// Statuses that disqualify a challenge outright
    pub excluded_statuses: Vec<ChallengeStatus>,
    /// Whether the externally computed permission decision is honored
    pub respect_permissions: bool,
    /// Whether completed challenges remain selectable
    pub include_completed: bool,
    /// Minimum attempts a challenge must have left to be selectable
    pub min_attempts_remaining: u32,
}

impl Default for EligibilityCriteria {
    fn default() -> Self {
        Self {
            excluded_statuses: vec![ChallengeStatus::GivenUp, ChallengeStatus::GameOver],
            respect_permissions: true,
            include_completed: false,
            min_attempts_remaining: 1,
        }
    }
}

impl EligibilityCriteria {
    /// Criteria with default exclusions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the excluded status set
    #[must_use]
    pub fn with_excluded_statuses(mut self, statuses: Vec<ChallengeStatus>) -> Self {
        self.excluded_statuses = statuses;
        self
    }

    /// Allow completed challenges to stay selectable
    #[must_use]
    pub const fn with_completed_included(mut self) -> Self {
        self.include_completed = true;
        self
    }

    /// Set the minimum attempts-remaining threshold
    #[must_use]
    pub const fn with_min_attempts(mut self, min: u32) -> Self {
        self.min_attempts_remaining = min;
        self
    }

    /// Ignore the external permission decision
    #[must_use]
    pub const fn ignoring_permissions(mut self) -> Self {
        self.respect_permissions = false;
        self
    }

    /// Check whether a status is disqualifying under these criteria
    #[must_use]
    pub fn excludes_status(&self, status: ChallengeStatus) -> bool {
        self.excluded_statuses.contains(&status)
    }
}
