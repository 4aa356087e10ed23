//! Session navigation context

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeId;

/// Maximum identifiers retained in the navigation history
pub const HISTORY_CAPACITY: usize = 10;

/// Session-level bookkeeping carried by the context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// When the session started
    pub session_start_time: DateTime<Utc>,
    /// Successful navigations so far
    pub challenges_navigated: u64,
    /// Whether the player has navigated at least once
    pub is_in_navigation_flow: bool,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            session_start_time: Utc::now(),
            challenges_navigated: 0,
            is_in_navigation_flow: false,
        }
    }
}

/// The session's navigation cursor plus bookkeeping.
///
/// Exactly one live instance per session; replaced wholesale on reset or
/// context restore. `Clone` is a deep copy (all fields are owned), which is
/// what snapshots rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationContext {
    /// Challenge the player is currently on
    pub current_challenge_id: Option<ChallengeId>,
    /// Challenge the player was on before the last navigation
    pub previous_challenge_id: Option<ChallengeId>,
    /// Cached eligible identifiers, refreshed on demand
    pub available_challenges: Vec<ChallengeId>,
    /// Ring of the most recently visited identifiers
    pub navigation_history: VecDeque<ChallengeId>,
    /// Opaque form state carried across navigation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserved_form_data: Option<serde_json::Value>,
    /// Session bookkeeping
    pub session_metadata: SessionMetadata,
}

impl Default for NavigationContext {
    fn default() -> Self {
        Self {
            current_challenge_id: None,
            previous_challenge_id: None,
            available_challenges: Vec::new(),
            navigation_history: VecDeque::with_capacity(HISTORY_CAPACITY),
            preserved_form_data: None,
            session_metadata: SessionMetadata::default(),
        }
    }
}

impl NavigationContext {
    /// Create a fresh context for a new session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful navigation to `id`.
    ///
    /// Shifts the cursor, appends to the bounded history and updates the
    /// session counters.
    pub fn advance_to(&mut self, id: ChallengeId) {
        self.previous_challenge_id = self.current_challenge_id.take();
        self.current_challenge_id = Some(id.clone());
        self.push_history(id);
        self.session_metadata.challenges_navigated += 1;
        self.session_metadata.is_in_navigation_flow = true;
    }

    /// Append to the history ring, evicting the oldest entry at capacity
    pub fn push_history(&mut self, id: ChallengeId) {
        if self.navigation_history.len() == HISTORY_CAPACITY {
            self.navigation_history.pop_front();
        }
        self.navigation_history.push_back(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_shifts_cursor_and_counts() {
        let mut ctx = NavigationContext::new();
        ctx.advance_to(ChallengeId::new("a"));
        ctx.advance_to(ChallengeId::new("b"));

        assert_eq!(ctx.current_challenge_id, Some(ChallengeId::new("b")));
        assert_eq!(ctx.previous_challenge_id, Some(ChallengeId::new("a")));
        assert_eq!(ctx.session_metadata.challenges_navigated, 2);
        assert!(ctx.session_metadata.is_in_navigation_flow);
    }

    #[test]
    fn history_is_bounded_and_evicts_oldest() {
        let mut ctx = NavigationContext::new();
        for i in 0..HISTORY_CAPACITY + 4 {
            ctx.push_history(ChallengeId::new(format!("c{i}")));
        }

        assert_eq!(ctx.navigation_history.len(), HISTORY_CAPACITY);
        assert_eq!(
            ctx.navigation_history.front(),
            Some(&ChallengeId::new("c4"))
        );
        assert_eq!(
            ctx.navigation_history.back(),
            Some(&ChallengeId::new(format!("c{}", HISTORY_CAPACITY + 3)))
        );
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let mut ctx = NavigationContext::new();
        ctx.advance_to(ChallengeId::new("a"));
        ctx.preserved_form_data = Some(serde_json::json!({"guess": "otter"}));

        let snapshot = ctx.clone();
        ctx.advance_to(ChallengeId::new("b"));

        assert_eq!(snapshot.current_challenge_id, Some(ChallengeId::new("a")));
        assert_eq!(
            snapshot.preserved_form_data,
            Some(serde_json::json!({"guess": "otter"}))
        );
    }
}
