//! Session navigation orchestration
//!
//! Owns the single authoritative [`NavigationContext`] for the session and
//! turns selector answers into [`NavigationOutcome`]s. Every failure is
//! handed to the recovery coordinator together with a rich failure report;
//! whatever the coordinator produces goes back to the caller verbatim.
//!
//! The API is single-flow by design: all operations take `&mut self` and
//! the caller is expected to serialize navigation requests (e.g. disable
//! the triggering control while a call is outstanding). There is no
//! internal single-flight guard.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use gauntlet_core::{
    AttemptRecord, ChallengeId, ChallengeRecord, EligibilityCriteria, EligibilityState,
    NavigationContext, NavigationErrorKind, NavigationOutcome, SelectionError, StateUpdate,
};

use crate::recovery::{ErrorRecoveryCoordinator, ErrorStatistics, FailureReport};
use crate::selector::ChallengeSelector;
use crate::store::ContextStore;

/// Maximum preserved context snapshots; the oldest is evicted beyond this
pub const SNAPSHOT_CAPACITY: usize = 5;

/// Generate an opaque snapshot key.
///
/// A process-wide sequence number keeps keys unique even when two
/// snapshots land on the same clock reading.
fn snapshot_key() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("ctx-{nanos:x}-{seq:x}")
}

/// State machine over one [`NavigationContext`].
///
/// Transitions: navigate-success (context advances), navigate-failure
/// (context unchanged unless auto-recovery substituted a challenge),
/// preserve (snapshot created), restore (context replaced wholesale),
/// reset (everything back to defaults). No terminal state; the engine runs
/// for the lifetime of the session.
#[derive(Debug)]
pub struct NavigationOrchestrator {
    selector: ChallengeSelector,
    context: NavigationContext,
    snapshots: VecDeque<(String, NavigationContext)>,
    recovery: ErrorRecoveryCoordinator,
}

impl Default for NavigationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationOrchestrator {
    /// Create an orchestrator with an empty pool and a fresh context
    #[must_use]
    pub fn new() -> Self {
        Self::from_selector(ChallengeSelector::new())
    }

    /// Create an orchestrator around a pre-configured selector
    #[must_use]
    pub fn from_selector(selector: ChallengeSelector) -> Self {
        Self {
            selector,
            context: NavigationContext::new(),
            snapshots: VecDeque::with_capacity(SNAPSHOT_CAPACITY),
            recovery: ErrorRecoveryCoordinator::new(),
        }
    }

    /// Attach a durable context store used by context-loss recovery
    #[must_use]
    pub fn with_context_store(
        mut self,
        store: Arc<dyn ContextStore>,
        session_key: impl Into<String>,
    ) -> Self {
        self.recovery = self.recovery.with_context_store(store, session_key);
        self
    }

    /// Replace the challenge pool and viewer hints (pass-through)
    pub fn initialize(
        &mut self,
        pool: Vec<ChallengeRecord>,
        states: HashMap<ChallengeId, EligibilityState>,
        viewer_attempts: Vec<AttemptRecord>,
        viewer_id: Option<String>,
    ) {
        self.selector
            .initialize(pool, states, viewer_attempts, viewer_id);
        self.refresh_available();
    }

    /// Consume the externally computed permission decision (pass-through)
    pub fn set_permission_decision(&mut self, granted: bool) {
        self.selector.set_permission_decision(granted);
        self.refresh_available();
    }

    /// Navigate to the next eligible challenge
    pub async fn next(&mut self) -> NavigationOutcome {
        let result = self
            .selector
            .next_after(self.context.current_challenge_id.as_ref(), None);
        self.conclude(result, "navigate_next").await
    }

    /// Navigate to the previous eligible challenge
    pub async fn previous(&mut self) -> NavigationOutcome {
        let result = self
            .selector
            .previous_before(self.context.current_challenge_id.as_ref(), None);
        self.conclude(result, "navigate_previous").await
    }

    /// Navigate directly to a specific challenge.
    ///
    /// An empty eligible set wins over the unknown-identifier check so
    /// direct access fails the same way the cyclic moves do when there is
    /// nothing to play.
    pub async fn go_to(&mut self, id: &ChallengeId) -> NavigationOutcome {
        let result = if self.selector.has_any_eligible() {
            self.selector.validate_access(id, None)
        } else {
            Err(SelectionError::no_available())
        };
        self.conclude(result, "navigate_to_challenge").await
    }

    async fn conclude(
        &mut self,
        result: Result<ChallengeId, SelectionError>,
        action: &str,
    ) -> NavigationOutcome {
        match result {
            Ok(id) => {
                self.commit(id.clone(), action);
                NavigationOutcome::success(id)
            }
            Err(err) => self.fail(err, action).await,
        }
    }

    /// Advance the context atomically after a successful selection
    fn commit(&mut self, id: ChallengeId, action: &str) {
        tracing::debug!(challenge = %id, action, "navigation succeeded");
        self.refresh_available();
        self.context.advance_to(id);
    }

    /// Hand a failure to the recovery coordinator and return its outcome
    /// verbatim. The context only moves when auto-recovery substituted a
    /// working challenge.
    async fn fail(&mut self, err: SelectionError, action: &str) -> NavigationOutcome {
        let eligible = self.selector.filter_eligible(None);
        let current = self.context.current_challenge_id.clone();
        let report = FailureReport {
            action: action.to_string(),
            detail: err.detail,
            current_state: current.as_ref().and_then(|id| self.selector.state(id).cloned()),
            current_challenge_id: current,
            eligible_count: eligible.len(),
            first_eligible: eligible.first().cloned(),
            navigation_possible: !eligible.is_empty(),
            timestamp: Utc::now(),
        };

        let outcome = self.recovery.handle(err.kind, report).await;
        if let (true, Some(recovered)) = (outcome.auto_recovered, outcome.challenge_id.clone()) {
            self.commit(recovered, action);
        }
        outcome
    }

    /// Deep-clone the live context into the bounded snapshot store.
    ///
    /// Optional form data is folded into the live context first so the
    /// snapshot and the session agree on it. Returns the opaque key.
    pub fn preserve_context(&mut self, form_data: Option<serde_json::Value>) -> String {
        if let Some(data) = form_data {
            self.context.preserved_form_data = Some(data);
        }

        let key = snapshot_key();
        if self.snapshots.len() == SNAPSHOT_CAPACITY {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back((key.clone(), self.context.clone()));
        tracing::debug!(key = %key, snapshots = self.snapshots.len(), "context preserved");
        key
    }

    /// Replace the live context with a previously preserved snapshot.
    ///
    /// The snapshot survives the restore and can be restored again until
    /// evicted. An unknown key is a context-loss failure.
    pub async fn restore_context(&mut self, key: &str) -> NavigationOutcome {
        let snapshot = self
            .snapshots
            .iter()
            .find(|(stored, _)| stored == key)
            .map(|(_, ctx)| ctx.clone());

        match snapshot {
            Some(restored) => {
                let current = restored.current_challenge_id.clone();
                self.context = restored;
                tracing::debug!(key = %key, "context restored");
                let mut outcome = NavigationOutcome::acknowledged();
                outcome.challenge_id = current;
                outcome
            }
            None => {
                let err = SelectionError::new(
                    NavigationErrorKind::ContextLoss,
                    format!("no preserved context under key '{key}'"),
                );
                self.fail(err, "restore_context").await
            }
        }
    }

    /// Merge a partial state update for a challenge (pass-through)
    pub fn update_challenge_state(&mut self, id: &ChallengeId, update: StateUpdate) {
        self.selector.update_state(id, update);
        self.refresh_available();
    }

    /// Ordered eligible identifiers, refreshing the context's cached list
    pub fn filter_eligible(&mut self, criteria: Option<&EligibilityCriteria>) -> Vec<ChallengeId> {
        let eligible = self.selector.filter_eligible(criteria);
        self.context.available_challenges = self.selector.filter_eligible(None);
        eligible
    }

    /// Whether any navigation is currently possible
    #[must_use]
    pub fn can_navigate(&self) -> bool {
        self.selector.has_any_eligible()
    }

    /// Number of currently eligible challenges
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.selector.eligible_count()
    }

    /// Replace the context and all derived state with defaults
    pub fn reset(&mut self) {
        tracing::debug!("orchestrator reset");
        self.context = NavigationContext::new();
        self.selector.clear_states();
        self.snapshots.clear();
    }

    /// The live navigation context
    #[must_use]
    pub const fn context(&self) -> &NavigationContext {
        &self.context
    }

    /// Tracked eligibility state for a challenge, if any
    #[must_use]
    pub fn eligibility_state(&self, id: &ChallengeId) -> Option<&EligibilityState> {
        self.selector.state(id)
    }

    /// Rolling failure statistics
    #[must_use]
    pub fn error_statistics(&self) -> ErrorStatistics {
        self.recovery.statistics()
    }

    /// Number of snapshots currently held
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    fn refresh_available(&mut self) {
        self.context.available_challenges = self.selector.filter_eligible(None);
    }
}
