//! Tagged navigation requests
//!
//! The host UI talks to the engine through one entry point: it builds a
//! [`NavigationRequest`] (deserializable straight from the wire) and gets
//! a [`NavigationOutcome`] back. Tags use the wire convention the rest of
//! the application speaks (`NAVIGATE_NEXT`, `RESTORE_CONTEXT`, ...).

use gauntlet_core::{ChallengeId, NavigationOutcome, StateUpdate};
use serde::{Deserialize, Serialize};

use crate::orchestrator::NavigationOrchestrator;

/// One navigation request from the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationRequest {
    /// Go directly to a challenge
    NavigateToChallenge {
        /// Target identifier
        id: ChallengeId,
    },
    /// Go to the next eligible challenge
    NavigateNext,
    /// Go to the previous eligible challenge
    NavigatePrevious,
    /// Merge a partial eligibility-state update
    UpdateChallengeState {
        /// Target identifier
        id: ChallengeId,
        /// Fields to merge
        update: StateUpdate,
    },
    /// Snapshot the live context
    PreserveContext {
        /// Optional form data to fold into the snapshot
        #[serde(default, skip_serializing_if = "Option::is_none")]
        form_data: Option<serde_json::Value>,
    },
    /// Replace the live context with a preserved snapshot
    RestoreContext {
        /// Key returned by an earlier preserve request
        key: String,
    },
}

impl NavigationOrchestrator {
    /// Dispatch a tagged navigation request
    pub async fn handle_request(&mut self, request: NavigationRequest) -> NavigationOutcome {
        match request {
            NavigationRequest::NavigateToChallenge { id } => self.go_to(&id).await,
            NavigationRequest::NavigateNext => self.next().await,
            NavigationRequest::NavigatePrevious => self.previous().await,
            NavigationRequest::UpdateChallengeState { id, update } => {
                self.update_challenge_state(&id, update);
                let mut outcome = NavigationOutcome::acknowledged();
                outcome.challenge_id = self.context().current_challenge_id.clone();
                outcome
            }
            NavigationRequest::PreserveContext { form_data } => {
                let key = self.preserve_context(form_data);
                let mut outcome = NavigationOutcome::acknowledged().with_snapshot_key(key);
                outcome.challenge_id = self.context().current_challenge_id.clone();
                outcome
            }
            NavigationRequest::RestoreContext { key } => self.restore_context(&key).await,
        }
    }
}
