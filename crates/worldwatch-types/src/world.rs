//! World population snapshots.
//!
//! A [`SnapshotSet`] is one complete poll of the world list. It is built
//! once and never mutated; the tracker replaces the previous set wholesale
//! at the end of every successful cycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::WorldId;

/// One world's state at the moment of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// The world number.
    pub world_id: WorldId,
    /// Players online at poll time.
    pub population: u32,
    /// Whether the world requires membership.
    pub is_members_world: bool,
    /// Whether the world is a player-versus-player world.
    pub is_pvp_world: bool,
}

/// Every world seen in one poll, keyed by world number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSet {
    captured_at: DateTime<Utc>,
    worlds: BTreeMap<WorldId, WorldSnapshot>,
}

impl SnapshotSet {
    /// Build a set captured now.
    ///
    /// If two snapshots share a world number, the later one wins.
    pub fn new(worlds: impl IntoIterator<Item = WorldSnapshot>) -> Self {
        Self::captured_at(Utc::now(), worlds)
    }

    /// Build a set with an explicit capture time.
    pub fn captured_at(
        captured_at: DateTime<Utc>,
        worlds: impl IntoIterator<Item = WorldSnapshot>,
    ) -> Self {
        Self {
            captured_at,
            worlds: worlds.into_iter().map(|w| (w.world_id, w)).collect(),
        }
    }

    /// When the poll that produced this set completed.
    pub const fn captured_at_time(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Look up one world.
    pub fn get(&self, world_id: WorldId) -> Option<&WorldSnapshot> {
        self.worlds.get(&world_id)
    }

    /// Number of worlds in the set.
    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    /// Whether the poll produced no usable rows.
    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }

    /// Iterate worlds in ascending world number order.
    pub fn iter(&self) -> impl Iterator<Item = &WorldSnapshot> {
        self.worlds.values()
    }

    /// Sum of all world populations.
    pub fn total_population(&self) -> u64 {
        self.worlds
            .values()
            .map(|w| u64::from(w.population))
            .fold(0, u64::saturating_add)
    }
}
