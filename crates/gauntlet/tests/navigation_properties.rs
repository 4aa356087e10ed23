//! Property-based tests for selector invariants using proptest.

use std::collections::HashMap;

use gauntlet::{ChallengeId, ChallengeRecord, ChallengeSelector, NavigationErrorKind};
use proptest::prelude::*;

/// Optimized proptest config for navigation property tests.
fn navigation_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        max_shrink_iters: 256,
        ..ProptestConfig::default()
    }
}

/// Strategy for generating pools of unique challenge identifiers.
fn unique_pool_strategy(max: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::hash_set("[a-z]{1,8}", 1..=max)
        .prop_map(|set| set.into_iter().collect())
}

fn selector_for(ids: &[String]) -> ChallengeSelector {
    let pool = ids
        .iter()
        .map(|id| ChallengeRecord::new(ChallengeId::new(id.clone()), id.clone()))
        .collect();
    let mut selector = ChallengeSelector::new();
    selector.initialize(pool, HashMap::new(), Vec::new(), None);
    selector
}

// ═══════════════════════════════════════════════════════════════════════════
// PROPERTY: Cyclic closure
// ═══════════════════════════════════════════════════════════════════════════

// Invariant: the eligible list is a ring. Starting anywhere inside it,
// exactly n forward steps (or n backward steps) return to the start.
proptest! {
    #![proptest_config(navigation_config())]

    #[test]
    fn n_next_steps_return_to_the_start(
        ids in unique_pool_strategy(8),
        start_index in 0usize..8,
    ) {
        let selector = selector_for(&ids);
        let start = ChallengeId::new(ids[start_index % ids.len()].clone());

        let mut cursor = start.clone();
        for _ in 0..ids.len() {
            cursor = selector.next_after(Some(&cursor), None).unwrap();
        }
        prop_assert_eq!(cursor, start);
    }

    #[test]
    fn n_previous_steps_return_to_the_start(
        ids in unique_pool_strategy(8),
        start_index in 0usize..8,
    ) {
        let selector = selector_for(&ids);
        let start = ChallengeId::new(ids[start_index % ids.len()].clone());

        let mut cursor = start.clone();
        for _ in 0..ids.len() {
            cursor = selector.previous_before(Some(&cursor), None).unwrap();
        }
        prop_assert_eq!(cursor, start);
    }

    // Forward then backward from anywhere lands back where it started.
    #[test]
    fn next_then_previous_is_identity(
        ids in unique_pool_strategy(8),
        start_index in 0usize..8,
    ) {
        let selector = selector_for(&ids);
        let start = ChallengeId::new(ids[start_index % ids.len()].clone());

        let forward = selector.next_after(Some(&start), None).unwrap();
        let back = selector.previous_before(Some(&forward), None).unwrap();
        prop_assert_eq!(back, start);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PROPERTY: Singleton refresh and determinism
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(navigation_config())]

    // A sole eligible challenge is always the answer, whatever the cursor
    // claims to be.
    #[test]
    fn singleton_pool_always_refreshes(
        id in "[a-z]{1,8}",
        bogus_cursor in "[a-z]{1,8}",
    ) {
        let selector = selector_for(&[id.clone()]);
        let expected = ChallengeId::new(id);
        let cursor = ChallengeId::new(bogus_cursor);

        prop_assert_eq!(
            selector.next_after(Some(&cursor), None).unwrap(),
            expected.clone()
        );
        prop_assert_eq!(
            selector.previous_before(Some(&cursor), None).unwrap(),
            expected
        );
    }

    // Filtering is deterministic for a fixed pool and fixed states.
    #[test]
    fn filtering_is_deterministic(ids in unique_pool_strategy(10)) {
        let selector = selector_for(&ids);
        let first = selector.filter_eligible(None);
        let second = selector.filter_eligible(None);
        prop_assert_eq!(first.clone(), second);
        prop_assert_eq!(first.len(), ids.len());
    }

    // A cursor outside the eligible set jumps to the first entry going
    // forward and the last entry going backward.
    #[test]
    fn unknown_cursor_jumps_to_the_ends(
        ids in unique_pool_strategy(8),
        ghost in "[A-Z]{1,8}",
    ) {
        prop_assume!(ids.len() > 1);
        let selector = selector_for(&ids);
        let eligible = selector.filter_eligible(None);
        let ghost = ChallengeId::new(ghost);

        prop_assert_eq!(
            selector.next_after(Some(&ghost), None).unwrap(),
            eligible[0].clone()
        );
        prop_assert_eq!(
            selector.previous_before(Some(&ghost), None).unwrap(),
            eligible[eligible.len() - 1].clone()
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PROPERTY: Empty pool never panics
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(navigation_config())]

    #[test]
    fn empty_pool_fails_cleanly(cursor in "[a-z]{1,8}") {
        let selector = ChallengeSelector::new();
        let cursor = ChallengeId::new(cursor);

        let err = selector.next_after(Some(&cursor), None).unwrap_err();
        prop_assert_eq!(err.kind, NavigationErrorKind::NoAvailableChallenges);

        let err = selector.previous_before(Some(&cursor), None).unwrap_err();
        prop_assert_eq!(err.kind, NavigationErrorKind::NoAvailableChallenges);
    }
}
