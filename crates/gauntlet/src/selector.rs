//! Eligibility filtering and cyclic challenge selection
//!
//! The selector treats the eligible list as a ring: advancing past the end
//! wraps to the start and retreating past the start wraps to the end. Two
//! recovery policies are baked into selection itself rather than the
//! recovery coordinator:
//! - a sole eligible challenge is re-selected even when it equals the
//!   current one (refresh, not an error)
//! - a current identifier missing from the eligible list jumps to the
//!   first entry for "next" and the last entry for "previous"

use std::collections::{HashMap, HashSet};

use gauntlet_core::{
    AttemptRecord, ChallengeId, ChallengeRecord, ChallengeStatus, EligibilityCriteria,
    EligibilityState, SelectionError, StateUpdate,
};

/// Pure ownership rule: which identifiers remain eligible for this viewer.
///
/// Supplied by application logic so the "exclude the viewer's own
/// challenges" rule can evolve without touching the selector.
pub type OwnershipFilter =
    Box<dyn Fn(&[ChallengeRecord], &[AttemptRecord], &str) -> HashSet<ChallengeId> + Send + Sync>;

fn default_ownership_filter(
    pool: &[ChallengeRecord],
    _attempts: &[AttemptRecord],
    viewer_id: &str,
) -> HashSet<ChallengeId> {
    pool.iter()
        .filter(|record| record.creator.as_deref() != Some(viewer_id))
        .map(|record| record.id.clone())
        .collect()
}

enum Direction {
    Forward,
    Backward,
}

fn state_is_eligible(state: &EligibilityState, criteria: &EligibilityCriteria) -> bool {
    if criteria.excludes_status(state.status) {
        return false;
    }
    if state.attempts_remaining < criteria.min_attempts_remaining {
        return false;
    }
    if !criteria.include_completed
        && (state.progress.is_completed || state.status == ChallengeStatus::Completed)
    {
        return false;
    }
    true
}

/// Holds the challenge pool and per-challenge state; computes the eligible
/// subset and answers next/previous/direct-access questions over it.
pub struct ChallengeSelector {
    pool: Vec<ChallengeRecord>,
    states: HashMap<ChallengeId, EligibilityState>,
    viewer_attempts: Vec<AttemptRecord>,
    viewer_id: Option<String>,
    permission_granted: bool,
    ownership_filter: OwnershipFilter,
}

impl std::fmt::Debug for ChallengeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeSelector")
            .field("pool_size", &self.pool.len())
            .field("tracked_states", &self.states.len())
            .field("viewer_id", &self.viewer_id)
            .field("permission_granted", &self.permission_granted)
            .finish_non_exhaustive()
    }
}

impl Default for ChallengeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeSelector {
    /// Create an empty selector
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            states: HashMap::new(),
            viewer_attempts: Vec::new(),
            viewer_id: None,
            permission_granted: true,
            ownership_filter: Box::new(default_ownership_filter),
        }
    }

    /// Replace the ownership rule
    #[must_use]
    pub fn with_ownership_filter(mut self, filter: OwnershipFilter) -> Self {
        self.ownership_filter = filter;
        self
    }

    /// Replace the pool, state map and viewer hints wholesale.
    ///
    /// Idempotent; safe to call repeatedly to refresh the pool.
    pub fn initialize(
        &mut self,
        pool: Vec<ChallengeRecord>,
        states: HashMap<ChallengeId, EligibilityState>,
        viewer_attempts: Vec<AttemptRecord>,
        viewer_id: Option<String>,
    ) {
        tracing::debug!(
            pool_size = pool.len(),
            viewer = viewer_id.as_deref().unwrap_or("anonymous"),
            "selector pool initialized"
        );
        self.pool = pool;
        self.states = states;
        self.viewer_attempts = viewer_attempts;
        self.viewer_id = viewer_id;
    }

    /// Consume the externally computed permission decision.
    ///
    /// The selector never derives this itself; it only honors it when the
    /// active criteria say permissions matter.
    pub fn set_permission_decision(&mut self, granted: bool) {
        self.permission_granted = granted;
    }

    /// Ordered eligible identifiers under the given (or default) criteria.
    ///
    /// Stable and deterministic for a fixed pool and fixed states; follows
    /// pool insertion order, never randomized. A challenge with no tracked
    /// state yet is eligible.
    #[must_use]
    pub fn filter_eligible(&self, criteria: Option<&EligibilityCriteria>) -> Vec<ChallengeId> {
        let default_criteria = EligibilityCriteria::default();
        let criteria = criteria.unwrap_or(&default_criteria);

        if criteria.respect_permissions && !self.permission_granted {
            return Vec::new();
        }

        let owned_allowed: Option<HashSet<ChallengeId>> = self
            .viewer_id
            .as_deref()
            .map(|viewer| (self.ownership_filter)(&self.pool, &self.viewer_attempts, viewer));

        self.pool
            .iter()
            .filter(|record| {
                if let Some(allowed) = &owned_allowed {
                    if !allowed.contains(&record.id) {
                        return false;
                    }
                }
                self.states
                    .get(&record.id)
                    .map_or(true, |state| state_is_eligible(state, criteria))
            })
            .map(|record| record.id.clone())
            .collect()
    }

    /// Next eligible challenge after `current`, with wraparound
    pub fn next_after(
        &self,
        current: Option<&ChallengeId>,
        criteria: Option<&EligibilityCriteria>,
    ) -> Result<ChallengeId, SelectionError> {
        self.advance(current, criteria, &Direction::Forward)
    }

    /// Previous eligible challenge before `current`, with wraparound
    pub fn previous_before(
        &self,
        current: Option<&ChallengeId>,
        criteria: Option<&EligibilityCriteria>,
    ) -> Result<ChallengeId, SelectionError> {
        self.advance(current, criteria, &Direction::Backward)
    }

    fn advance(
        &self,
        current: Option<&ChallengeId>,
        criteria: Option<&EligibilityCriteria>,
        direction: &Direction,
    ) -> Result<ChallengeId, SelectionError> {
        let eligible = self.filter_eligible(criteria);
        if eligible.is_empty() {
            return Err(SelectionError::no_available());
        }

        let first = eligible
            .first()
            .cloned()
            .ok_or_else(|| SelectionError::loop_failure("eligible list lost its head"))?;
        let last = eligible
            .last()
            .cloned()
            .ok_or_else(|| SelectionError::loop_failure("eligible list lost its tail"))?;

        // Sole eligible entry: re-selecting it is a refresh, not an error.
        if eligible.len() == 1 {
            return Ok(first);
        }

        let position = current.and_then(|id| eligible.iter().position(|entry| entry == id));
        let Some(index) = position else {
            // Current id vanished from the eligible set; jump to an end
            // rather than failing the player.
            return Ok(match direction {
                Direction::Forward => first,
                Direction::Backward => last,
            });
        };

        let len = eligible.len();
        let target = match direction {
            Direction::Forward => index
                .checked_add(1)
                .map(|next| next % len)
                .ok_or_else(|| SelectionError::loop_failure("index overflow advancing forward"))?,
            Direction::Backward => index
                .checked_add(len)
                .and_then(|shifted| shifted.checked_sub(1))
                .map(|prev| prev % len)
                .ok_or_else(|| SelectionError::loop_failure("index underflow stepping back"))?,
        };

        eligible
            .get(target)
            .cloned()
            .ok_or_else(|| SelectionError::loop_failure(format!("computed index {target} out of bounds")))
    }

    /// Validate direct access to an arbitrary identifier
    pub fn validate_access(
        &self,
        id: &ChallengeId,
        criteria: Option<&EligibilityCriteria>,
    ) -> Result<ChallengeId, SelectionError> {
        if !self.pool.iter().any(|record| &record.id == id) {
            return Err(SelectionError::not_found(id));
        }
        if !self.filter_eligible(criteria).contains(id) {
            return Err(SelectionError::permission_denied(id));
        }
        Ok(id.clone())
    }

    /// Merge a partial update into a challenge's state, creating a default
    /// state first if none exists. Callers must re-filter to see the effect.
    pub fn update_state(&mut self, id: &ChallengeId, update: StateUpdate) {
        self.states.entry(id.clone()).or_default().apply(update);
    }

    /// Tracked state for an identifier, if any
    #[must_use]
    pub fn state(&self, id: &ChallengeId) -> Option<&EligibilityState> {
        self.states.get(id)
    }

    /// Number of currently eligible challenges
    #[must_use]
    pub fn eligible_count(&self) -> usize {
        self.filter_eligible(None).len()
    }

    /// Whether any challenge is currently eligible
    #[must_use]
    pub fn has_any_eligible(&self) -> bool {
        !self.filter_eligible(None).is_empty()
    }

    /// First eligible identifier, used by loop-failure recovery
    #[must_use]
    pub fn first_eligible(&self) -> Option<ChallengeId> {
        self.filter_eligible(None).into_iter().next()
    }

    /// Drop all tracked eligibility state (bulk reset)
    pub fn clear_states(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use gauntlet_core::{ChallengeStatus, NavigationErrorKind, PlayerProgress};

    use super::*;

    fn pool(ids: &[&str]) -> Vec<ChallengeRecord> {
        ids.iter()
            .map(|id| ChallengeRecord::new(ChallengeId::new(*id), format!("Challenge {id}")))
            .collect()
    }

    fn selector_with(ids: &[&str]) -> ChallengeSelector {
        let mut selector = ChallengeSelector::new();
        selector.initialize(pool(ids), HashMap::new(), Vec::new(), None);
        selector
    }

    #[test]
    fn untracked_challenges_are_eligible_in_insertion_order() {
        let selector = selector_with(&["a", "b", "c"]);
        let eligible = selector.filter_eligible(None);
        assert_eq!(
            eligible,
            vec![
                ChallengeId::new("a"),
                ChallengeId::new("b"),
                ChallengeId::new("c")
            ]
        );
    }

    #[test]
    fn completed_challenges_are_filtered_out_by_default() {
        let mut selector = selector_with(&["a", "b"]);
        selector.update_state(
            &ChallengeId::new("a"),
            StateUpdate::status(ChallengeStatus::Completed),
        );

        assert_eq!(selector.filter_eligible(None), vec![ChallengeId::new("b")]);
    }

    #[test]
    fn completed_challenges_stay_when_criteria_include_them() {
        let mut selector = selector_with(&["a", "b"]);
        selector.update_state(
            &ChallengeId::new("a"),
            StateUpdate::status(ChallengeStatus::Completed),
        );

        let criteria = EligibilityCriteria::new().with_completed_included();
        assert_eq!(selector.filter_eligible(Some(&criteria)).len(), 2);
    }

    #[test]
    fn completed_progress_excludes_even_when_status_is_active() {
        let mut selector = selector_with(&["a", "b"]);
        selector.update_state(
            &ChallengeId::new("a"),
            StateUpdate::default().with_progress(PlayerProgress {
                is_completed: true,
                ..PlayerProgress::default()
            }),
        );

        assert_eq!(selector.filter_eligible(None), vec![ChallengeId::new("b")]);
    }

    #[test]
    fn exhausted_attempts_disqualify() {
        let mut selector = selector_with(&["a", "b"]);
        selector.update_state(&ChallengeId::new("a"), StateUpdate::attempts_remaining(0));

        assert_eq!(selector.filter_eligible(None), vec![ChallengeId::new("b")]);
    }

    #[test]
    fn viewer_created_challenges_are_excluded() {
        let mut selector = ChallengeSelector::new();
        let pool = vec![
            ChallengeRecord::new(ChallengeId::new("mine"), "Mine").with_creator("viewer-1"),
            ChallengeRecord::new(ChallengeId::new("theirs"), "Theirs").with_creator("viewer-2"),
        ];
        selector.initialize(pool, HashMap::new(), Vec::new(), Some("viewer-1".to_string()));

        assert_eq!(
            selector.filter_eligible(None),
            vec![ChallengeId::new("theirs")]
        );
    }

    #[test]
    fn denied_permission_empties_the_eligible_set() {
        let mut selector = selector_with(&["a", "b"]);
        selector.set_permission_decision(false);

        assert!(selector.filter_eligible(None).is_empty());

        let criteria = EligibilityCriteria::new().ignoring_permissions();
        assert_eq!(selector.filter_eligible(Some(&criteria)).len(), 2);
    }

    #[test]
    fn next_and_previous_walk_the_ring() {
        let selector = selector_with(&["a", "b", "c"]);
        let b = ChallengeId::new("b");

        let next = selector.next_after(Some(&b), None).unwrap();
        assert_eq!(next, ChallengeId::new("c"));

        let wrapped = selector.next_after(Some(&next), None).unwrap();
        assert_eq!(wrapped, ChallengeId::new("a"));

        let back = selector.previous_before(Some(&wrapped), None).unwrap();
        assert_eq!(back, ChallengeId::new("c"));
    }

    #[test]
    fn sole_eligible_challenge_is_a_refresh() {
        let selector = selector_with(&["only"]);
        let only = ChallengeId::new("only");

        assert_eq!(selector.next_after(Some(&only), None).unwrap(), only);
        assert_eq!(selector.previous_before(Some(&only), None).unwrap(), only);
    }

    #[test]
    fn empty_pool_fails_with_no_available() {
        let selector = ChallengeSelector::new();
        let err = selector.next_after(None, None).unwrap_err();
        assert_eq!(err.kind, NavigationErrorKind::NoAvailableChallenges);

        let err = selector.previous_before(None, None).unwrap_err();
        assert_eq!(err.kind, NavigationErrorKind::NoAvailableChallenges);
    }

    #[test]
    fn unknown_current_jumps_to_first_for_next_and_last_for_previous() {
        let mut selector = selector_with(&["a", "b", "c"]);
        selector.update_state(
            &ChallengeId::new("b"),
            StateUpdate::status(ChallengeStatus::GivenUp),
        );
        let gone = ChallengeId::new("b");

        assert_eq!(
            selector.next_after(Some(&gone), None).unwrap(),
            ChallengeId::new("a")
        );
        assert_eq!(
            selector.previous_before(Some(&gone), None).unwrap(),
            ChallengeId::new("c")
        );
    }

    #[test]
    fn no_current_starts_at_an_end() {
        let selector = selector_with(&["a", "b", "c"]);
        assert_eq!(
            selector.next_after(None, None).unwrap(),
            ChallengeId::new("a")
        );
        assert_eq!(
            selector.previous_before(None, None).unwrap(),
            ChallengeId::new("c")
        );
    }

    #[test]
    fn validate_access_distinguishes_unknown_from_ineligible() {
        let mut selector = selector_with(&["a", "b"]);
        selector.update_state(
            &ChallengeId::new("b"),
            StateUpdate::status(ChallengeStatus::GameOver),
        );

        let err = selector
            .validate_access(&ChallengeId::new("ghost"), None)
            .unwrap_err();
        assert_eq!(err.kind, NavigationErrorKind::ChallengeNotFound);

        let err = selector
            .validate_access(&ChallengeId::new("b"), None)
            .unwrap_err();
        assert_eq!(err.kind, NavigationErrorKind::PermissionDenied);

        assert!(selector.validate_access(&ChallengeId::new("a"), None).is_ok());
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut selector = selector_with(&["a", "b"]);
        selector.initialize(pool(&["a", "b"]), HashMap::new(), Vec::new(), None);
        assert_eq!(selector.eligible_count(), 2);
        assert!(selector.has_any_eligible());
    }

    #[test]
    fn custom_ownership_filter_is_honored() {
        let mut selector = ChallengeSelector::new().with_ownership_filter(Box::new(
            |pool: &[ChallengeRecord], _: &[AttemptRecord], _: &str| {
                // Everything except the first entry.
                pool.iter().skip(1).map(|r| r.id.clone()).collect()
            },
        ));
        selector.initialize(
            pool(&["a", "b", "c"]),
            HashMap::new(),
            Vec::new(),
            Some("viewer-1".to_string()),
        );

        assert_eq!(
            selector.filter_eligible(None),
            vec![ChallengeId::new("b"), ChallengeId::new("c")]
        );
    }
}
