//! # Section Module
//!
//! This module provides the `Section` struct, a fixed-size cube of blocks and
//! the mesh generated from it. A section is the unit of meshing: edits mark
//! sections dirty, and remeshing always rebuilds one whole section.
//!
//! ## Storage
//!
//! Sections keep two parallel views of their contents:
//! - `blocks`: a dense array of block ids, one per position (default air)
//! - `solid_array`: a bit vector with one bit per position, set for solid blocks
//!
//! Block reads and writes are O(1) against the dense array. The bit vector lets
//! the mesher test solidity and skip empty space without decoding block ids,
//! and it is what boundary planes are cut from when a neighbour needs them.
//!
//! Both views are indexed `x + size * (y + size * z)` and are only ever
//! written together through [`Section::set_block`].

use bitvec::prelude::BitVec;

use super::block::block_side::{Axis, BlockSide};
use super::block::Block;
use super::location::{LocalBlockPos, SectionKey};
use crate::engine_state::rendering::meshing::{self, Mesh, SectionNeighbors};

pub mod section_iteration;

/// Default number of blocks along each edge of a section.
pub const SECTION_SIZE: usize = 16;

/// A cube of `size³` blocks plus its most recently generated mesh.
///
/// Invariant: if `mesh` is present it was built from the block array as it
/// stood when [`Section::generate_mesh`] last ran. Edits applied since then are
/// not visible until the section is remeshed.
#[derive(Debug)]
pub struct Section {
    size: usize,
    blocks: Vec<Block>,
    solid_array: BitVec,
    solid_count: usize,
    mesh: Option<Mesh>,
    mesh_revision: u64,
}

impl Section {
    /// Creates a section filled with air.
    pub fn empty(size: usize) -> Self {
        let volume = size * size * size;
        Section {
            size,
            blocks: vec![Block::AIR; volume],
            solid_array: BitVec::repeat(false, volume),
            solid_count: 0,
            mesh: None,
            mesh_revision: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the block at a local position.
    ///
    /// # Panics
    /// Panics if the position is outside the section.
    pub fn get_block(&self, pos: LocalBlockPos) -> Block {
        self.blocks[self.checked_index(pos)]
    }

    /// Writes a block id. Pure data mutation; the mesh is left untouched until
    /// the owner decides to remesh.
    ///
    /// # Panics
    /// Panics if the position is outside the section.
    pub fn set_block(&mut self, pos: LocalBlockPos, block: Block) {
        let index = self.checked_index(pos);
        let was_solid = self.solid_array[index];
        let is_solid = block.is_solid();

        self.blocks[index] = block;
        self.solid_array.set(index, is_solid);

        match (was_solid, is_solid) {
            (false, true) => self.solid_count += 1,
            (true, false) => self.solid_count -= 1,
            _ => {}
        }
    }

    /// Checks if the block at the specified local coordinates is solid.
    pub fn is_block_solid(&self, x: usize, y: usize, z: usize) -> bool {
        self.solid_array[x + self.size * (y + self.size * z)]
    }

    /// `true` when every block is air.
    pub fn is_empty(&self) -> bool {
        self.solid_count == 0
    }

    pub fn solid_count(&self) -> usize {
        self.solid_count
    }

    /// Solidity of the layer of blocks touching `side`, flattened with
    /// [`plane_index`]. This is what the section across `side` needs to cull
    /// its own faces.
    pub fn boundary_plane(&self, side: BlockSide) -> BitVec {
        let layer = if side.is_positive() { self.size - 1 } else { 0 };
        let mut plane = BitVec::repeat(false, self.size * self.size);

        for b in 0..self.size {
            for a in 0..self.size {
                let pos = match side.axis() {
                    Axis::X => LocalBlockPos::new(layer, a, b),
                    Axis::Y => LocalBlockPos::new(a, layer, b),
                    Axis::Z => LocalBlockPos::new(a, b, layer),
                };
                if self.solid_array[pos.index(self.size)] {
                    plane.set(a + self.size * b, true);
                }
            }
        }

        plane
    }

    /// Rebuilds this section's mesh from its current blocks and the boundary
    /// planes of its six neighbours.
    ///
    /// The previous mesh is replaced wholesale, so calling this twice on an
    /// unchanged section with unchanged neighbours yields the same mesh.
    pub fn generate_mesh(&mut self, key: SectionKey, neighbors: &SectionNeighbors) {
        let mesh = meshing::build_section_mesh(self, key, neighbors);
        self.mesh = Some(mesh);
        self.mesh_revision += 1;
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Number of times this section has been meshed.
    pub fn mesh_revision(&self) -> u64 {
        self.mesh_revision
    }

    fn checked_index(&self, pos: LocalBlockPos) -> usize {
        assert!(
            pos.is_within(self.size),
            "local position {:?} outside section of size {}",
            pos,
            self.size
        );
        pos.index(self.size)
    }
}

/// Flattens a local position onto the plane perpendicular to `axis`.
///
/// The two remaining coordinates are taken in (x, y, z) order, so an X plane is
/// indexed by (y, z), a Y plane by (x, z) and a Z plane by (x, y).
pub fn plane_index(axis: Axis, pos: LocalBlockPos, size: usize) -> usize {
    let (a, b) = match axis {
        Axis::X => (pos.y, pos.z),
        Axis::Y => (pos.x, pos.z),
        Axis::Z => (pos.x, pos.y),
    };
    a + size * b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn set_then_get_returns_the_new_block_before_any_remesh() {
        let mut section = Section::empty(16);
        let pos = LocalBlockPos::new(15, 3, 8);

        assert_eq!(section.get_block(pos), Block::AIR);
        section.set_block(pos, Block::new(BlockType::STONE));

        assert_eq!(section.get_block(pos), Block::new(BlockType::STONE));
        assert!(section.is_block_solid(15, 3, 8));
        assert!(!section.has_mesh());
        assert_eq!(section.solid_count(), 1);
    }

    #[test]
    fn overwriting_with_air_clears_solidity() {
        let mut section = Section::empty(4);
        let pos = LocalBlockPos::new(1, 2, 3);

        section.set_block(pos, Block::new(BlockType::DIRT));
        section.set_block(pos, Block::new(BlockType::GRASS));
        assert_eq!(section.solid_count(), 1);

        section.set_block(pos, Block::AIR);
        assert!(section.is_empty());
        assert!(!section.is_block_solid(1, 2, 3));
    }

    #[test]
    fn boundary_plane_matches_plane_index() {
        let mut section = Section::empty(4);
        let pos = LocalBlockPos::new(3, 1, 2);
        section.set_block(pos, Block::new(BlockType::STONE));

        let back = section.boundary_plane(BlockSide::BACK);
        assert!(back[plane_index(Axis::X, pos, 4)]);
        assert_eq!(back.count_ones(), 1);

        assert_eq!(section.boundary_plane(BlockSide::FRONT).count_ones(), 0);
    }

    #[test]
    #[should_panic(expected = "outside section")]
    fn out_of_range_access_panics() {
        let section = Section::empty(4);
        section.get_block(LocalBlockPos::new(4, 0, 0));
    }
}
