//! Process-wide floors and caps.
//!
//! These are constants, not user configuration. [`DiffLimits`] exists so
//! tests and embedders can run the diff engine with different caps.

/// Shortest accepted poll interval, in seconds.
pub const MIN_POLL_INTERVAL_SECS: u64 = 10;

/// Smallest accepted population threshold.
pub const MIN_POPULATION_THRESHOLD: u32 = 8;

/// More qualifying spikes than this in one cycle collapse into a summary.
pub const MAX_EVENTS_PER_CYCLE: usize = 10;

/// Deltas larger than this are treated as glitches and dropped.
pub const MAX_SPIKE_MAGNITUDE: u64 = 1000;

/// Caps applied by the diff engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffLimits {
    /// Collapse threshold for one cycle's events.
    pub max_events_per_cycle: usize,
    /// Largest absolute delta still reported as a spike.
    pub max_spike_magnitude: u64,
}

impl Default for DiffLimits {
    fn default() -> Self {
        Self {
            max_events_per_cycle: MAX_EVENTS_PER_CYCLE,
            max_spike_magnitude: MAX_SPIKE_MAGNITUDE,
        }
    }
}
