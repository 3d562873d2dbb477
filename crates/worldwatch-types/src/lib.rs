//! Shared type definitions for the Worldwatch population tracker.
//!
//! Every crate in the workspace speaks in these types: the collector
//! produces [`SnapshotSet`]s, the diff engine turns pairs of them into
//! [`SpikeEvent`]s, and event sinks receive a [`SpikeReport`] per cycle.
//!
//! # Modules
//!
//! - [`ids`] -- The [`WorldId`] newtype
//! - [`enums`] -- [`ServerFilter`] and [`TrackerState`]
//! - [`world`] -- [`WorldSnapshot`] and [`SnapshotSet`]
//! - [`spike`] -- [`SpikeEvent`] and [`SpikeReport`]

pub mod enums;
pub mod ids;
pub mod spike;
pub mod world;

// Re-export all public types at crate root for convenience.
pub use enums::{ParseServerFilterError, ServerFilter, TrackerState};
pub use ids::WorldId;
pub use spike::{SpikeEvent, SpikeReport};
pub use world::{SnapshotSet, WorldSnapshot};
