use bitvec::prelude::BitVec;

use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::location::LocalBlockPos;
use crate::engine_state::voxels::section::plane_index;

/// Read-only copies of the boundary layers of a section's six neighbours.
///
/// Slot `side as usize` holds the layer of the neighbour across `side` that
/// touches this section, cut with [`Section::boundary_plane`]. A missing plane
/// means the neighbour is not resident and reads as air.
///
/// [`Section::boundary_plane`]: crate::engine_state::voxels::section::Section::boundary_plane
#[derive(Debug, Clone, Default)]
pub struct SectionNeighbors {
    planes: [Option<BitVec>; 6],
}

impl SectionNeighbors {
    /// No neighbours: every face on the section boundary is visible.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn set(&mut self, side: BlockSide, plane: BitVec) {
        self.planes[side as usize] = Some(plane);
    }

    /// Whether the block just across `side` from the boundary position `pos`
    /// is solid.
    pub fn is_solid(&self, side: BlockSide, pos: LocalBlockPos, size: usize) -> bool {
        self.planes[side as usize]
            .as_ref()
            .map(|plane| plane[plane_index(side.axis(), pos, size)])
            .unwrap_or(false)
    }
}
