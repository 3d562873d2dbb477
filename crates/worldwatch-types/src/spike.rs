//! Spike events and per-cycle reports.

use serde::{Deserialize, Serialize};

use crate::ids::WorldId;

/// A population change on one world that met the tracker threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpikeEvent {
    /// The world that changed.
    pub world_id: WorldId,
    /// Signed change since the previous poll. Positive is an increase.
    pub delta: i64,
    /// Whether the world requires membership.
    pub is_members_world: bool,
    /// Whether the world is a player-versus-player world.
    pub is_pvp_world: bool,
}

impl SpikeEvent {
    /// Whether the population went up.
    pub const fn is_increase(&self) -> bool {
        self.delta > 0
    }

    /// Absolute size of the change.
    pub const fn magnitude(&self) -> u64 {
        self.delta.unsigned_abs()
    }

    /// Short world type label, e.g. `F2P` or `P2P · PVP`.
    pub const fn label(&self) -> &'static str {
        match (self.is_members_world, self.is_pvp_world) {
            (false, false) => "F2P",
            (true, false) => "P2P",
            (false, true) => "F2P · PVP",
            (true, true) => "P2P · PVP",
        }
    }
}

/// What one tracker cycle hands to the event sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpikeReport {
    /// Individual spikes, possibly none.
    Spikes {
        /// The qualifying events.
        events: Vec<SpikeEvent>,
    },
    /// Too many worlds spiked at once; only the count is reported.
    Collapsed {
        /// How many worlds qualified.
        count: usize,
        /// The threshold they crossed.
        threshold: u32,
    },
}

impl SpikeReport {
    /// A report with nothing in it.
    pub const fn empty() -> Self {
        Self::Spikes { events: Vec::new() }
    }

    /// Whether the report carries no spikes at all.
    pub const fn is_empty(&self) -> bool {
        match self {
            Self::Spikes { events } => events.is_empty(),
            Self::Collapsed { count, .. } => *count == 0,
        }
    }

    /// Number of worlds the report covers.
    pub const fn spike_count(&self) -> usize {
        match self {
            Self::Spikes { events } => events.len(),
            Self::Collapsed { count, .. } => *count,
        }
    }
}
