//! # Section Iteration Module
//!
//! An iterator over the solid blocks of a section. It walks the `solid_array`
//! bit vector to skip air, so meshing a mostly empty section costs little more
//! than scanning its bits.

use bitvec::slice::IterOnes;
use bitvec::order::Lsb0;

use super::Section;
use crate::engine_state::voxels::{block::Block, location::LocalBlockPos};

/// An iterator over all non-air blocks in a section, in storage order.
pub struct SectionBlockIterator<'a> {
    section_ref: &'a Section,
    ones: IterOnes<'a, usize, Lsb0>,
}

impl<'a> SectionBlockIterator<'a> {
    pub fn new(section_ref: &'a Section) -> Self {
        SectionBlockIterator {
            section_ref,
            ones: section_ref.solid_array.iter_ones(),
        }
    }
}

impl<'a> Iterator for SectionBlockIterator<'a> {
    type Item = (LocalBlockPos, Block);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.ones.next()?;
        let size = self.section_ref.size;
        let pos = LocalBlockPos::new(index % size, (index / size) % size, index / (size * size));
        Some((pos, self.section_ref.blocks[index]))
    }
}

impl Section {
    /// Iterates over every solid block with its local position.
    pub fn solid_blocks(&self) -> SectionBlockIterator<'_> {
        SectionBlockIterator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn yields_only_solid_blocks_with_their_positions() {
        let mut section = Section::empty(4);
        section.set_block(LocalBlockPos::new(0, 0, 0), Block::new(BlockType::DIRT));
        section.set_block(LocalBlockPos::new(3, 2, 1), Block::new(BlockType::WOOD));

        let blocks: Vec<_> = section.solid_blocks().collect();

        assert_eq!(
            blocks,
            vec![
                (LocalBlockPos::new(0, 0, 0), Block::new(BlockType::DIRT)),
                (LocalBlockPos::new(3, 2, 1), Block::new(BlockType::WOOD)),
            ]
        );
    }
}
