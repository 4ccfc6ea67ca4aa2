//! Property-based tests for quenero-params
//!
//! Uses proptest to verify resolver and derived-parameter invariants across
//! randomized inputs

use std::time::Duration;

use proptest::prelude::*;
use quenero_params::derived::{
    blocks_expected_in_days_at, blocks_expected_in_hours_at, blocks_expected_in_years_at,
    estimate_height,
};
use quenero_params::hardfork::{ForkEntry, PRE_ACTIVATION_PARAMS, STANDARD_FORK_ENTRIES};
use quenero_params::{ForkSchedule, HardForkVersion, HeightAnchor};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Any version byte, including ones this build has no name for
fn version_strategy() -> impl Strategy<Value = HardForkVersion> {
    any::<u8>().prop_map(HardForkVersion::new)
}

/// Target block times from 1 second to 2 hours, millisecond resolution
fn target_strategy() -> impl Strategy<Value = Duration> {
    (1_000u64..=7_200_000).prop_map(Duration::from_millis)
}

/// Schedules with random strictly ascending activations
fn schedule_strategy() -> impl Strategy<Value = ForkSchedule> {
    prop::collection::btree_set(any::<u8>(), 1..8).prop_map(|activations| {
        let entries = activations
            .into_iter()
            .zip(STANDARD_FORK_ENTRIES.iter().cycle())
            .map(|(raw, entry)| ForkEntry {
                activation: HardForkVersion::new(raw),
                params: entry.params,
            })
            .collect();
        ForkSchedule::new(PRE_ACTIVATION_PARAMS, entries)
            .expect("ascending by construction")
    })
}

// ============================================================================
// Hard-Fork Resolver Properties
// ============================================================================

proptest! {
    /// Property: the entry used for v never activates after v
    #[test]
    fn prop_resolver_never_uses_future_activation(
        schedule in schedule_strategy(),
        version in version_strategy()
    ) {
        if let Some(activation) = schedule.resolve_activation(version) {
            prop_assert!(activation <= version);
        } else {
            prop_assert!(schedule.entries()[0].activation > version);
        }
    }

    /// Property: the entry used is the greatest activation not above v
    #[test]
    fn prop_resolver_picks_floor_entry(
        schedule in schedule_strategy(),
        version in version_strategy()
    ) {
        let expected = schedule
            .entries()
            .iter()
            .filter(|entry| entry.activation <= version)
            .max_by_key(|entry| entry.activation);

        let wanted = expected.map_or(schedule.pre_activation(), |entry| &entry.params);
        prop_assert_eq!(schedule.resolve(version), wanted);
    }

    /// Property: the activation used never moves backwards as versions rise
    #[test]
    fn prop_resolver_is_monotonic(
        schedule in schedule_strategy(),
        a in version_strategy(),
        b in version_strategy()
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(schedule.resolve_activation(low) <= schedule.resolve_activation(high));
    }

    /// Property: resolution is deterministic
    #[test]
    fn prop_resolver_is_deterministic(version in version_strategy()) {
        let first = ForkSchedule::standard();
        let second = ForkSchedule::standard();
        prop_assert_eq!(first.resolve(version), second.resolve(version));
    }
}

// ============================================================================
// Derived Parameter Properties
// ============================================================================

proptest! {
    /// Property: calendar identities hold exactly at any target
    #[test]
    fn prop_calendar_identities(target in target_strategy(), n in 0u64..1_000) {
        prop_assert_eq!(
            blocks_expected_in_days_at(target, n),
            blocks_expected_in_hours_at(target, 24) * n
        );
        prop_assert_eq!(
            blocks_expected_in_years_at(target, n),
            blocks_expected_in_days_at(target, 365) * n
        );
    }

    /// Property: the estimate never runs ahead of the blocks that could exist
    #[test]
    fn prop_estimate_never_overshoots(
        height in 0u64..10_000_000,
        anchor_ts in 1_500_000_000i64..1_700_000_000,
        offset in 0i64..100_000_000,
        target in target_strategy()
    ) {
        let anchor = HeightAnchor::new(height, anchor_ts);
        let estimate = estimate_height(anchor, anchor_ts + offset, target);
        let produced = u128::from(estimate - height);
        let target_ms = target.as_millis();
        let offset_ms = offset as u128 * 1_000;

        prop_assert!(produced * target_ms <= offset_ms);
        prop_assert!((produced + 1) * target_ms > offset_ms);
    }

    /// Property: counting back before the anchor never lands above the
    /// height the chain could have had
    #[test]
    fn prop_estimate_before_anchor_never_overshoots(
        height in 0u64..10_000_000,
        anchor_ts in 1_500_000_000i64..1_700_000_000,
        offset in 1i64..100_000_000,
        target in target_strategy()
    ) {
        let anchor = HeightAnchor::new(height, anchor_ts);
        let estimate = estimate_height(anchor, anchor_ts - offset, target);
        let removed = u128::from(height - estimate);
        let target_ms = target.as_millis();
        let offset_ms = offset as u128 * 1_000;

        prop_assert!(estimate == 0 || removed * target_ms >= offset_ms);
    }

    /// Property: the estimate grows with time
    #[test]
    fn prop_estimate_is_monotonic(
        height in 0u64..10_000_000,
        anchor_ts in 1_500_000_000i64..1_700_000_000,
        a in -100_000_000i64..100_000_000,
        b in -100_000_000i64..100_000_000,
        target in target_strategy()
    ) {
        let anchor = HeightAnchor::new(height, anchor_ts);
        let (early, late) = if a <= b { (a, b) } else { (b, a) };

        prop_assert!(
            estimate_height(anchor, anchor_ts + early, target)
                <= estimate_height(anchor, anchor_ts + late, target)
        );
    }
}
