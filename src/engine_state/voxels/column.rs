//! # Column Module
//!
//! A `Column` is the vertical stack of sections at one (x, z) position. It is
//! the unit the streaming scheduler loads and unloads.
//!
//! ## Lifecycle
//!
//! A column moves through these states, in order:
//!
//! 1. *registered* - inserted into the chunk store, no block data yet
//! 2. *generating* - block data is being produced on a worker
//! 3. *has block data* - generation installed its sections
//! 4. *meshed* - every section has a mesh
//! 5. *marked for deletion* - still resident, skipped by new work (the marker
//!    lives on the store's `ColumnHandle`)
//! 6. *reaped* - dropped from the store by the frame driver
//!
//! Sections are stored by slot in a plain `Vec` owned by the column. Growth is
//! monotonic: `add_section` only ever appends, and no section is removed
//! before the whole column is reaped.

use cgmath::Point3;
use log::trace;

use super::block::Block;
use super::generator::{ColumnAccess, GenerationContext, TerrainGenerator};
use super::location::{ColumnKey, LocalBlockPos};
use super::section::Section;

/// Blocks produced for a column by a terrain generator, not yet visible to
/// anyone else. Built off-lock, then installed in one step.
#[derive(Debug)]
pub struct GeneratedColumn {
    pub key: ColumnKey,
    pub sections: Vec<Section>,
}

/// The vertical stack of sections at one column key.
#[derive(Debug)]
pub struct Column {
    key: ColumnKey,
    section_size: usize,
    max_sections: usize,
    sections: Vec<Section>,
    has_block_data: bool,
    meshed: bool,
}

impl Column {
    /// Creates a registered column with no sections and no block data.
    pub fn new(key: ColumnKey, section_size: usize, max_sections: usize) -> Self {
        Column {
            key,
            section_size,
            max_sections,
            sections: Vec::new(),
            has_block_data: false,
            meshed: false,
        }
    }

    pub fn key(&self) -> ColumnKey {
        self.key
    }

    pub fn section_size(&self) -> usize {
        self.section_size
    }

    pub fn max_sections(&self) -> usize {
        self.max_sections
    }

    /// Appends the next vertical section, filled with air.
    ///
    /// # Panics
    /// Panics if the column already holds `max_sections` sections. Growing a
    /// column past the configured height is a programming error.
    pub fn add_section(&mut self) -> &mut Section {
        assert!(
            self.sections.len() < self.max_sections,
            "column {} cannot grow past {} sections",
            self.key,
            self.max_sections
        );
        self.sections.push(Section::empty(self.section_size));
        self.meshed = false;
        let slot = self.sections.len() - 1;
        &mut self.sections[slot]
    }

    /// Grows the column until `slot` exists and returns that section.
    ///
    /// # Panics
    /// Panics if `slot` is at or above `max_sections`.
    pub fn ensure_section(&mut self, slot: usize) -> &mut Section {
        while self.sections.len() <= slot {
            self.add_section();
        }
        &mut self.sections[slot]
    }

    pub fn get_section(&self, slot: usize) -> Option<&Section> {
        self.sections.get(slot)
    }

    pub fn get_section_mut(&mut self, slot: usize) -> Option<&mut Section> {
        self.sections.get_mut(slot)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn sections(&self) -> impl Iterator<Item = (usize, &Section)> {
        self.sections.iter().enumerate()
    }

    /// Block at a column-local position, where `y` is measured in blocks from
    /// the bottom of slot 0. Missing sections read as air.
    pub fn get_block(&self, x: usize, y: i32, z: usize) -> Block {
        if y < 0 {
            return Block::AIR;
        }
        let y = y as usize;
        let slot = y / self.section_size;
        match self.sections.get(slot) {
            Some(section) => {
                section.get_block(LocalBlockPos::new(x, y % self.section_size, z))
            }
            None => Block::AIR,
        }
    }

    /// Writes a block into a slot, growing the column as needed. Does not
    /// trigger meshing.
    pub fn set_block(&mut self, slot: usize, pos: LocalBlockPos, block: Block) {
        self.ensure_section(slot).set_block(pos, block);
    }

    pub fn has_block_data(&self) -> bool {
        self.has_block_data
    }

    /// `true` once every section has a mesh built since block data arrived.
    pub fn has_mesh(&self) -> bool {
        self.meshed
    }

    /// Called by the mesher after it rebuilt some sections. An all-air
    /// section without a mesh counts as meshed, since its mesh would be empty.
    pub fn mark_meshed(&mut self) {
        self.meshed = self.has_block_data
            && self
                .sections
                .iter()
                .all(|section| section.has_mesh() || section.is_empty());
    }

    pub fn needs_generation(&self) -> bool {
        !self.has_block_data
    }

    /// Runs the generator for a column without touching any shared state.
    ///
    /// The result is installed later with [`Column::install_generated`], so a
    /// column is never observed half-written.
    pub fn generate_detached(
        key: ColumnKey,
        generator: &dyn TerrainGenerator,
        context: &GenerationContext,
    ) -> GeneratedColumn {
        let mut access = ColumnAccess::new(key, context.section_size, context.max_sections);
        let mut rng = context.rng_for(key);
        generator.generate(&mut access, &mut rng, context);
        GeneratedColumn {
            key,
            sections: access.into_sections(),
        }
    }

    /// Installs generated blocks. Returns `false` and discards the blocks if
    /// this column already has block data.
    ///
    /// # Panics
    /// Panics if the generated blocks belong to another column.
    pub fn install_generated(&mut self, generated: GeneratedColumn) -> bool {
        assert_eq!(
            generated.key, self.key,
            "generated blocks installed into the wrong column"
        );
        if self.has_block_data {
            return false;
        }

        // Edits may already have grown this column; keep them on top.
        let mut sections = generated.sections;
        for (slot, existing) in self.sections.drain(..).enumerate() {
            if slot < sections.len() {
                for (pos, block) in existing.solid_blocks() {
                    sections[slot].set_block(pos, block);
                }
            } else {
                sections.push(existing);
            }
        }

        self.sections = sections;
        self.has_block_data = true;
        self.meshed = false;
        trace!(
            "column {} received {} sections of block data",
            self.key,
            self.sections.len()
        );
        true
    }

    /// Performs the column's one unit of terrain generation if it has not been
    /// generated yet. Returns whether any work was done.
    ///
    /// This is the synchronous path: it generates while the caller holds the
    /// column. The streaming scheduler runs the same two halves,
    /// [`Column::generate_detached`] and [`Column::install_generated`], from a
    /// `ColumnGenerationTask` with the lock released in between.
    pub fn try_gen(&mut self, generator: &dyn TerrainGenerator, context: &GenerationContext) -> bool {
        if !self.needs_generation() {
            return false;
        }
        let generated = Self::generate_detached(self.key, generator, context);
        self.install_generated(generated)
    }

    /// World block coordinate of this column's (0, 0, 0) corner.
    pub fn origin(&self) -> Point3<i32> {
        self.key.section(0).origin(self.section_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::generator::FlatTerrainGenerator;

    fn context() -> GenerationContext {
        GenerationContext::new(16, 4, 7, ColumnKey::default())
    }

    #[test]
    fn sections_grow_monotonically_and_default_to_air() {
        let mut column = Column::new(ColumnKey::new(0, 0), 16, 4);
        assert!(column.get_section(2).is_none());

        column.ensure_section(2);

        assert_eq!(column.section_count(), 3);
        assert!(column.get_section(2).is_some_and(Section::is_empty));
        assert_eq!(column.get_block(0, 40, 0), Block::AIR);
        assert_eq!(column.get_block(0, 400, 0), Block::AIR);
        assert_eq!(column.get_block(0, -1, 0), Block::AIR);
    }

    #[test]
    #[should_panic(expected = "cannot grow past")]
    fn growing_past_the_height_limit_panics() {
        let mut column = Column::new(ColumnKey::new(0, 0), 16, 2);
        column.ensure_section(2);
    }

    #[test]
    fn try_gen_does_work_exactly_once() {
        let generator = FlatTerrainGenerator::new(20, BlockType::STONE);
        let mut column = Column::new(ColumnKey::new(3, -1), 16, 4);

        assert!(column.try_gen(&generator, &context()));
        assert!(column.has_block_data());
        assert!(!column.has_mesh());
        assert_eq!(column.get_block(5, 19, 5), Block::new(BlockType::STONE));
        assert_eq!(column.get_block(5, 20, 5), Block::AIR);

        assert!(!column.try_gen(&generator, &context()));
    }

    #[test]
    fn generation_keeps_edits_made_while_registered() {
        let generator = FlatTerrainGenerator::new(4, BlockType::DIRT);
        let mut column = Column::new(ColumnKey::new(0, 0), 16, 4);
        column.set_block(1, LocalBlockPos::new(2, 2, 2), Block::new(BlockType::WOOD));
        column.set_block(0, LocalBlockPos::new(0, 10, 0), Block::new(BlockType::SAND));

        let generated = Column::generate_detached(column.key(), &generator, &context());
        assert!(column.install_generated(generated));

        assert_eq!(column.get_block(2, 18, 2), Block::new(BlockType::WOOD));
        assert_eq!(column.get_block(0, 10, 0), Block::new(BlockType::SAND));
        assert_eq!(column.get_block(0, 3, 0), Block::new(BlockType::DIRT));
    }
}
