//! Block-to-movement ownership.
//!
//! Ownership is resolved once per piece into a dense table covering the whole
//! block space, so every lookup on the playback path is a single index.
//!
//! Cadenza reservations resolve to their enclosing movement, whether or not the
//! movement's own reservation already covers them.

use crate::block::{BlockId, BLOCK_SPACE};
use crate::model::Movement;

#[derive(Debug, Clone)]
pub struct BlockIndex {
    owners: Vec<Option<u32>>,
}

impl BlockIndex {
    pub fn new(movements: &[Movement]) -> Self {
        let owners = (0..BLOCK_SPACE)
            .map(|id| owning_movement(movements, BlockId(id)))
            .collect();
        Self { owners }
    }

    /// Movement number owning `block`, or `None` when the block is unowned.
    ///
    /// Movement markers `9800 + n` resolve to `n` directly.
    pub fn movement_of(&self, block: BlockId) -> Option<u32> {
        self.owners.get(block.index()).copied().flatten()
    }

    pub fn is_owned(&self, block: BlockId) -> bool {
        self.movement_of(block).is_some()
    }
}

fn owning_movement(movements: &[Movement], block: BlockId) -> Option<u32> {
    if let Some(movement) = block.marked_movement() {
        return Some(movement);
    }
    movements
        .iter()
        .find(|mov| {
            mov.reservation.contains(block)
                || mov.cadenza.iter().any(|cad| cad.reservation.contains(block))
        })
        .map(|mov| mov.number)
}
