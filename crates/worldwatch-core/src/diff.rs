//! Spike detection between two consecutive snapshots.
//!
//! [`diff`] is a pure function: same inputs, same events, no side effects.
//! [`DiffEngine`] adds the per-cycle event cap on top, collapsing a flood
//! of spikes (for example after the data source resets every world at
//! once) into a single [`SpikeReport::Collapsed`].

use worldwatch_types::{SnapshotSet, SpikeEvent, SpikeReport};

use crate::config::TrackerConfig;
use crate::limits::{DiffLimits, MAX_SPIKE_MAGNITUDE};

/// Compare two snapshots using the default magnitude ceiling.
///
/// See [`DiffEngine::diff`] for the rules.
pub fn diff(
    previous: &SnapshotSet,
    current: &SnapshotSet,
    config: &TrackerConfig,
) -> Vec<SpikeEvent> {
    diff_with_ceiling(previous, current, config, MAX_SPIKE_MAGNITUDE)
}

fn diff_with_ceiling(
    previous: &SnapshotSet,
    current: &SnapshotSet,
    config: &TrackerConfig,
    max_spike_magnitude: u64,
) -> Vec<SpikeEvent> {
    let threshold = u64::from(config.population_threshold());
    let filter = config.server_filter();

    current
        .iter()
        .filter_map(|now| {
            // Worlds without a previous sample have nothing to diff against.
            let before = previous.get(now.world_id)?;
            let delta = i64::from(now.population).saturating_sub(i64::from(before.population));
            let magnitude = delta.unsigned_abs();

            if magnitude < threshold
                || !filter.accepts(now.is_members_world)
                || magnitude > max_spike_magnitude
            {
                return None;
            }

            Some(SpikeEvent {
                world_id: now.world_id,
                delta,
                is_members_world: now.is_members_world,
                is_pvp_world: now.is_pvp_world,
            })
        })
        .collect()
}

/// Spike detection with configurable caps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffEngine {
    limits: DiffLimits,
}

impl DiffEngine {
    /// Create an engine with the given caps.
    pub const fn new(limits: DiffLimits) -> Self {
        Self { limits }
    }

    /// Find every world whose population moved by at least the threshold.
    ///
    /// A world produces an event only when it is present in both snapshots,
    /// its absolute delta is at least the threshold, it passes the server
    /// filter, and its absolute delta does not exceed the magnitude ceiling.
    /// Events come out in ascending world order.
    pub fn diff(
        &self,
        previous: &SnapshotSet,
        current: &SnapshotSet,
        config: &TrackerConfig,
    ) -> Vec<SpikeEvent> {
        diff_with_ceiling(previous, current, config, self.limits.max_spike_magnitude)
    }

    /// Wrap a cycle's events for the sink, collapsing them past the cap.
    pub fn report(&self, events: Vec<SpikeEvent>, config: &TrackerConfig) -> SpikeReport {
        if events.len() > self.limits.max_events_per_cycle {
            SpikeReport::Collapsed {
                count: events.len(),
                threshold: config.population_threshold(),
            }
        } else {
            SpikeReport::Spikes { events }
        }
    }

    /// [`diff`](Self::diff) followed by [`report`](Self::report).
    pub fn compare(
        &self,
        previous: &SnapshotSet,
        current: &SnapshotSet,
        config: &TrackerConfig,
    ) -> SpikeReport {
        self.report(self.diff(previous, current, config), config)
    }
}
