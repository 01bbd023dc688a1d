//! # Edit Queue Module
//!
//! Gameplay code never writes blocks directly. It submits edits here, and the
//! frame driver drains the whole queue once per frame, applies every edit and
//! then remeshes each affected section exactly once.

use std::mem;

use cgmath::Point3;

use super::block::Block;
use crate::core::MtResource;

/// One pending block change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PendingEdit {
    /// World block coordinate.
    pub position: Point3<i32>,
    pub block: Block,
}

/// Append-only buffer of pending edits.
///
/// `submit` can be called from any thread. `drain` swaps the whole buffer out
/// under the lock, so a reader never sees a partially drained queue.
#[derive(Clone)]
pub struct EditQueue {
    pending: MtResource<Vec<PendingEdit>>,
}

impl EditQueue {
    pub fn new() -> Self {
        EditQueue {
            pending: MtResource::new(Vec::new()),
        }
    }

    pub fn submit(&self, position: Point3<i32>, block: Block) {
        self.pending.get_mut().push(PendingEdit { position, block });
    }

    /// Takes every pending edit, in submission order, leaving the queue empty.
    pub fn drain(&self) -> Vec<PendingEdit> {
        mem::take(&mut *self.pending.get_mut())
    }

    pub fn len(&self) -> usize {
        self.pending.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.get().is_empty()
    }
}

impl Default for EditQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn drain_takes_everything_in_order() {
        let queue = EditQueue::new();
        queue.submit(Point3::new(1, 2, 3), Block::new(BlockType::DIRT));
        queue.submit(Point3::new(1, 2, 3), Block::AIR);
        assert_eq!(queue.len(), 2);

        let edits = queue.drain();

        assert!(queue.is_empty());
        assert_eq!(edits[0].block, Block::new(BlockType::DIRT));
        assert_eq!(edits[1].block, Block::AIR);
        assert!(queue.drain().is_empty());
    }
}
