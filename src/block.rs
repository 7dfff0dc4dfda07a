//! Block identifiers.
//!
//! A block is an addressable region of a rendered score page. Identifiers live in
//! `[0, 10000)` and fall into three disjoint groups:
//! - ordinary score regions, assigned by the score renderer
//! - movement markers `9800 + n`, meaning "the start of movement `n`"
//! - the sentinel `9999`, meaning "no current position"

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the addressable block-identifier space.
pub const BLOCK_SPACE: u32 = 10_000;

/// First identifier of the movement-marker range.
pub const MARKER_BASE: u32 = 9_800;

/// One past the last identifier of the movement-marker range.
pub const MARKER_END: u32 = 9_900;

/// Raw value of the "no position" sentinel.
pub const SENTINEL: u32 = 9_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

impl BlockId {
    /// The "not yet playing / no resolved position" sentinel.
    pub const NONE: BlockId = BlockId(SENTINEL);

    /// Marker identifier that navigates to the start of `movement`.
    ///
    /// Returns `None` when the movement number does not fit the marker range.
    pub fn movement_marker(movement: u32) -> Option<BlockId> {
        let id = MARKER_BASE.checked_add(movement)?;
        (id < MARKER_END).then_some(BlockId(id))
    }

    /// The movement this marker points at, if this is a marker.
    pub fn marked_movement(self) -> Option<u32> {
        self.is_movement_marker().then(|| self.0 - MARKER_BASE)
    }

    pub fn is_movement_marker(self) -> bool {
        (MARKER_BASE..MARKER_END).contains(&self.0)
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// True when the identifier lies inside the addressable space.
    pub fn in_space(self) -> bool {
        self.0 < BLOCK_SPACE
    }

    /// The identifier one below this one, if any.
    pub fn previous(self) -> Option<BlockId> {
        self.0.checked_sub(1).map(BlockId)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<u32> for BlockId {
    fn from(id: u32) -> Self {
        BlockId(id)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
