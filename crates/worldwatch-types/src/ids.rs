//! Identifier newtypes.
//!
//! Worlds are numbered by the game (301, 308, 420, ...). Wrapping the raw
//! integer keeps world numbers from being mixed up with populations or
//! deltas, which are integers too.

use serde::{Deserialize, Serialize};

/// The public number of a game world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub u32);

impl WorldId {
    /// Return the raw world number.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for WorldId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorldId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<WorldId> for u32 {
    fn from(id: WorldId) -> Self {
        id.0
    }
}
