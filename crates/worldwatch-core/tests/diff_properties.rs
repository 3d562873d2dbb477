//! Property-based tests for the diff engine.
//!
//! These check the spike rules over arbitrary snapshot pairs rather than
//! hand-picked examples.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use proptest::prelude::*;
use worldwatch_core::config::TrackerConfig;
use worldwatch_core::diff::diff;
use worldwatch_core::limits::MAX_SPIKE_MAGNITUDE;
use worldwatch_types::{ServerFilter, SnapshotSet, WorldId, WorldSnapshot};

fn world(id: u32, population: u32, members: bool) -> WorldSnapshot {
    WorldSnapshot {
        world_id: WorldId(id),
        population,
        is_members_world: members,
        is_pvp_world: false,
    }
}

fn filter_strategy() -> impl Strategy<Value = ServerFilter> {
    prop_oneof![
        Just(ServerFilter::F2p),
        Just(ServerFilter::P2p),
        Just(ServerFilter::All),
    ]
}

/// Worlds 1..=40 with random populations and membership.
fn snapshot_strategy() -> impl Strategy<Value = Vec<(u32, u32, bool)>> {
    prop::collection::vec((1u32..=40, 0u32..3000, any::<bool>()), 0..40)
}

fn to_set(rows: &[(u32, u32, bool)]) -> SnapshotSet {
    SnapshotSet::new(
        rows.iter()
            .map(|&(id, pop, members)| world(id, pop, members)),
    )
}

proptest! {
    #[test]
    fn prop_identical_snapshots_never_spike(
        rows in snapshot_strategy(),
        threshold in 8u32..200,
        filter in filter_strategy(),
    ) {
        let set = to_set(&rows);
        let config = TrackerConfig::new(threshold, 10, filter).unwrap();
        prop_assert!(diff(&set, &set, &config).is_empty());
    }

    #[test]
    fn prop_every_event_obeys_the_rules(
        before in snapshot_strategy(),
        after in snapshot_strategy(),
        threshold in 8u32..200,
        filter in filter_strategy(),
    ) {
        let previous = to_set(&before);
        let current = to_set(&after);
        let config = TrackerConfig::new(threshold, 10, filter).unwrap();

        for event in diff(&previous, &current, &config) {
            let old = previous.get(event.world_id);
            let new = current.get(event.world_id);
            prop_assert!(
                old.is_some() && new.is_some(),
                "event for world missing on one side"
            );
            let (old, new) = (old.unwrap(), new.unwrap());

            prop_assert_eq!(
                event.delta,
                i64::from(new.population) - i64::from(old.population)
            );
            prop_assert!(event.magnitude() >= u64::from(threshold));
            prop_assert!(event.magnitude() <= MAX_SPIKE_MAGNITUDE);
            prop_assert!(filter.accepts(event.is_members_world));
        }
    }

    #[test]
    fn prop_threshold_boundary_is_inclusive(
        base in 0u32..2000,
        threshold in 8u32..500,
        increase in any::<bool>(),
    ) {
        prop_assume!(base >= threshold || increase);
        let moved = if increase { base + threshold } else { base - threshold };
        let previous = SnapshotSet::new([world(1, base, false)]);
        let at = SnapshotSet::new([world(1, moved, false)]);
        let config = TrackerConfig::new(threshold, 10, ServerFilter::All).unwrap();
        prop_assert_eq!(diff(&previous, &at, &config).len(), 1);

        let just_under = if increase { moved - 1 } else { moved + 1 };
        let under = SnapshotSet::new([world(1, just_under, false)]);
        prop_assert!(diff(&previous, &under, &config).is_empty());
    }

    #[test]
    fn prop_new_worlds_never_spike(
        rows in snapshot_strategy(),
        extra_pop in 0u32..1000,
    ) {
        let previous = to_set(&rows);
        let mut grown = rows;
        grown.push((1000, extra_pop, false));
        let current = to_set(&grown);
        let config = TrackerConfig::new(8, 10, ServerFilter::All).unwrap();

        let events = diff(&previous, &current, &config);
        prop_assert!(events.iter().all(|e| e.world_id != WorldId(1000)));
    }
}
