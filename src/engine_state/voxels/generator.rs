//! # Terrain Generator Module
//!
//! The seam between the streaming core and procedural generation.
//!
//! A [`TerrainGenerator`] fills one column at a time through a [`ColumnAccess`],
//! using a pseudo-random generator seeded from the world seed and the column
//! key. Generators must be idempotent for a given (column, seed) and must not
//! depend on any other column, which is what lets the scheduler run them in
//! parallel on worker threads.
//!
//! Two generators ship with the engine:
//! - [`FlatTerrainGenerator`]: a flat slab, used for testing
//! - [`NoiseTerrainGenerator`]: Perlin heightmap terrain with structures from
//!   the [`StructureId`] catalogue

use cgmath::Point3;
use noise::{NoiseFn, Perlin};

use super::block::{block_type::BlockType, Block};
use super::location::{ColumnKey, LocalBlockPos};
use super::section::Section;

/// Per-run inputs shared by every generation unit.
#[derive(Clone, Debug)]
pub struct GenerationContext {
    pub section_size: usize,
    pub max_sections: usize,
    pub world_seed: u64,
    /// Column the observer stood in when this generation pass was planned.
    pub observer: ColumnKey,
}

impl GenerationContext {
    pub fn new(section_size: usize, max_sections: usize, world_seed: u64, observer: ColumnKey) -> Self {
        GenerationContext {
            section_size,
            max_sections,
            world_seed,
            observer,
        }
    }

    /// A random generator bound to one column. The same (seed, key) always
    /// produces the same sequence.
    pub fn rng_for(&self, key: ColumnKey) -> fastrand::Rng {
        fastrand::Rng::with_seed(column_seed(self.world_seed, key))
    }

    /// Height of a full column in blocks.
    pub fn height_limit(&self) -> i32 {
        (self.section_size * self.max_sections) as i32
    }
}

/// Mixes the world seed with a column key (splitmix64 finaliser).
fn column_seed(world_seed: u64, key: ColumnKey) -> u64 {
    let mut z = world_seed
        ^ (key.x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (key.z as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F).rotate_left(32);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Procedural terrain for one column at a time.
pub trait TerrainGenerator: Send + Sync {
    fn generate(&self, access: &mut ColumnAccess, rng: &mut fastrand::Rng, context: &GenerationContext);
}

/// Write access to a column that is still being generated.
///
/// Writes outside the column's horizontal footprint or outside its height
/// range are ignored, so structures near a column edge are clipped rather
/// than spilling into neighbours.
pub struct ColumnAccess {
    key: ColumnKey,
    section_size: usize,
    max_sections: usize,
    sections: Vec<Section>,
}

impl ColumnAccess {
    pub fn new(key: ColumnKey, section_size: usize, max_sections: usize) -> Self {
        ColumnAccess {
            key,
            section_size,
            max_sections,
            sections: Vec::new(),
        }
    }

    pub fn key(&self) -> ColumnKey {
        self.key
    }

    pub fn section_size(&self) -> usize {
        self.section_size
    }

    pub fn height_limit(&self) -> i32 {
        (self.section_size * self.max_sections) as i32
    }

    /// World block coordinate of the column's (0, 0, 0) corner.
    pub fn origin(&self) -> Point3<i32> {
        self.key.section(0).origin(self.section_size)
    }

    /// Writes a block at column-local (x, z) and absolute height `y`.
    /// Returns whether the write landed.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, block: Block) -> bool {
        if x >= self.section_size || z >= self.section_size || y < 0 || y >= self.height_limit() {
            return false;
        }
        let y = y as usize;
        let slot = y / self.section_size;
        while self.sections.len() <= slot {
            self.sections.push(Section::empty(self.section_size));
        }
        self.sections[slot].set_block(LocalBlockPos::new(x, y % self.section_size, z), block);
        true
    }

    /// Writes a block at a world block coordinate, if it falls in this column.
    pub fn set_block_world(&mut self, pos: Point3<i32>, block: Block) -> bool {
        let origin = self.origin();
        let (x, z) = (pos.x - origin.x, pos.z - origin.z);
        if x < 0 || z < 0 {
            return false;
        }
        self.set_block(x as usize, pos.y, z as usize, block)
    }

    pub fn get_block(&self, x: usize, y: i32, z: usize) -> Block {
        if x >= self.section_size || z >= self.section_size || y < 0 {
            return Block::AIR;
        }
        let y = y as usize;
        self.sections
            .get(y / self.section_size)
            .map(|section| section.get_block(LocalBlockPos::new(x, y % self.section_size, z)))
            .unwrap_or(Block::AIR)
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }
}

/// A flat slab of one block type from height 0 up to (not including) `height`.
pub struct FlatTerrainGenerator {
    height: i32,
    block: Block,
}

impl FlatTerrainGenerator {
    pub fn new(height: i32, block_type: BlockType) -> Self {
        FlatTerrainGenerator {
            height,
            block: Block::new(block_type),
        }
    }
}

impl TerrainGenerator for FlatTerrainGenerator {
    fn generate(&self, access: &mut ColumnAccess, _rng: &mut fastrand::Rng, _context: &GenerationContext) {
        let size = access.section_size();
        for y in 0..self.height.min(access.height_limit()) {
            for z in 0..size {
                for x in 0..size {
                    access.set_block(x, y, z, self.block);
                }
            }
        }
    }
}

/// Horizontal scale applied to world coordinates when sampling height noise.
pub const HEIGHT_SCALE_FACTOR: f64 = 0.012;
/// Horizontal scale applied when sampling the desert/forest biome noise.
pub const BIOME_SCALE_FACTOR: f64 = 0.004;
/// Biome noise below this value produces desert.
pub const DESERT_THRESHOLD: f64 = -0.25;

/// Heightmap terrain from 2D Perlin noise, decorated with structures.
pub struct NoiseTerrainGenerator {
    height_noise: Perlin,
    biome_noise: Perlin,
    base_height: i32,
    amplitude: f64,
}

impl NoiseTerrainGenerator {
    pub fn new(world_seed: u64, base_height: i32, amplitude: f64) -> Self {
        NoiseTerrainGenerator {
            height_noise: Perlin::new(world_seed as u32),
            biome_noise: Perlin::new((world_seed as u32).wrapping_add(1)),
            base_height,
            amplitude,
        }
    }

    /// Surface height at a world (x, z), clamped so structures fit on top.
    pub fn height_at(&self, x: i32, z: i32, height_limit: i32) -> i32 {
        let sample = self
            .height_noise
            .get([x as f64 * HEIGHT_SCALE_FACTOR, z as f64 * HEIGHT_SCALE_FACTOR]);
        let height = self.base_height + (sample * self.amplitude).round() as i32;
        height.clamp(1, (height_limit - 12).max(1))
    }

    pub fn is_desert(&self, x: i32, z: i32) -> bool {
        self.biome_noise
            .get([x as f64 * BIOME_SCALE_FACTOR, z as f64 * BIOME_SCALE_FACTOR])
            < DESERT_THRESHOLD
    }
}

impl TerrainGenerator for NoiseTerrainGenerator {
    fn generate(&self, access: &mut ColumnAccess, rng: &mut fastrand::Rng, context: &GenerationContext) {
        let size = access.section_size();
        let origin = access.origin();
        let height_limit = context.height_limit();

        for z in 0..size {
            for x in 0..size {
                let (wx, wz) = (origin.x + x as i32, origin.z + z as i32);
                let height = self.height_at(wx, wz, height_limit);
                let desert = self.is_desert(wx, wz);

                for y in 0..height {
                    let block_type = if y < height - 4 {
                        BlockType::STONE
                    } else if desert {
                        BlockType::SAND
                    } else if y == height - 1 {
                        BlockType::GRASS
                    } else {
                        BlockType::DIRT
                    };
                    access.set_block(x, y, z, Block::new(block_type));
                }
            }
        }

        // Structures are placed away from the column edge so most of them fit.
        let margin = 2usize.min(size / 2);
        if size <= 2 * margin {
            return;
        }
        for _ in 0..rng.usize(0..3) {
            let x = rng.usize(margin..size - margin);
            let z = rng.usize(margin..size - margin);
            let (wx, wz) = (origin.x + x as i32, origin.z + z as i32);
            let base = Point3::new(wx, self.height_at(wx, wz, height_limit), wz);

            let structure = if self.is_desert(wx, wz) {
                if rng.u32(0..40) == 0 {
                    StructureId::Pyramid
                } else {
                    StructureId::AcaciaTree
                }
            } else {
                StructureId::OakTree
            };
            place_structure(access, base, rng, structure);
        }
    }
}

/// Catalogue of structures the default generator can place.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StructureId {
    OakTree = 0,
    AcaciaTree = 1,
    Pyramid = 100,
}

/// Places a structure with its base at a world block coordinate.
pub fn place_structure(access: &mut ColumnAccess, base: Point3<i32>, rng: &mut fastrand::Rng, id: StructureId) {
    match id {
        StructureId::OakTree => make_oak_tree(access, base, rng),
        StructureId::AcaciaTree => make_acacia_tree(access, base, rng),
        StructureId::Pyramid => make_pyramid(access, base),
    }
}

fn make_oak_tree(access: &mut ColumnAccess, base: Point3<i32>, rng: &mut fastrand::Rng) {
    let trunk_height = rng.i32(4..7);
    let top = base.y + trunk_height;
    let leaves = Block::new(BlockType::LEAVES);

    for y in top - 2..=top + 1 {
        let radius = if y > top { 1 } else { 2 };
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                access.set_block_world(Point3::new(base.x + dx, y, base.z + dz), leaves);
            }
        }
    }
    for y in base.y..top {
        access.set_block_world(Point3::new(base.x, y, base.z), Block::new(BlockType::WOOD));
    }
}

fn make_acacia_tree(access: &mut ColumnAccess, base: Point3<i32>, rng: &mut fastrand::Rng) {
    let trunk_height = rng.i32(3..6);
    let lean = if rng.bool() { 1 } else { -1 };
    let top = base.y + trunk_height;
    let crown = Point3::new(base.x + lean, top, base.z);

    for y in base.y..top {
        let x = if y >= base.y + trunk_height / 2 { base.x + lean } else { base.x };
        access.set_block_world(Point3::new(x, y, base.z), Block::new(BlockType::WOOD));
    }
    for dz in -2..=2 {
        for dx in -2..=2 {
            access.set_block_world(
                Point3::new(crown.x + dx, crown.y, crown.z + dz),
                Block::new(BlockType::LEAVES),
            );
        }
    }
}

fn make_pyramid(access: &mut ColumnAccess, base: Point3<i32>) {
    let sand = Block::new(BlockType::SAND);
    let half_width = 6;
    for level in 0..=half_width {
        let radius = half_width - level;
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                access.set_block_world(Point3::new(base.x + dx, base.y + level, base.z + dz), sand);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(generator: &dyn TerrainGenerator, key: ColumnKey, seed: u64) -> Vec<Section> {
        let context = GenerationContext::new(16, 8, seed, ColumnKey::default());
        let mut access = ColumnAccess::new(key, 16, 8);
        let mut rng = context.rng_for(key);
        generator.generate(&mut access, &mut rng, &context);
        access.into_sections()
    }

    fn blocks_of(sections: &[Section]) -> Vec<Vec<(LocalBlockPos, Block)>> {
        sections.iter().map(|s| s.solid_blocks().collect()).collect()
    }

    #[test]
    fn noise_generation_is_idempotent_per_column_and_seed() {
        let generator = NoiseTerrainGenerator::new(42, 40, 12.0);
        let key = ColumnKey::new(-3, 7);

        let first = generate(&generator, key, 42);
        let second = generate(&generator, key, 42);

        assert!(!first.is_empty());
        assert_eq!(blocks_of(&first), blocks_of(&second));
    }

    #[test]
    fn column_rngs_differ_between_columns() {
        let context = GenerationContext::new(16, 8, 9, ColumnKey::default());
        let a: Vec<u64> = (0..4).map({
            let mut rng = context.rng_for(ColumnKey::new(0, 1));
            move |_| rng.u64(..)
        }).collect();
        let b: Vec<u64> = (0..4).map({
            let mut rng = context.rng_for(ColumnKey::new(1, 0));
            move |_| rng.u64(..)
        }).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn access_ignores_writes_outside_the_column() {
        let mut access = ColumnAccess::new(ColumnKey::new(1, 1), 16, 2);

        assert!(!access.set_block_world(Point3::new(15, 3, 20), Block::new(BlockType::DIRT)));
        assert!(!access.set_block_world(Point3::new(20, 32, 20), Block::new(BlockType::DIRT)));
        assert!(!access.set_block_world(Point3::new(20, -1, 20), Block::new(BlockType::DIRT)));
        assert!(access.set_block_world(Point3::new(16, 31, 31), Block::new(BlockType::DIRT)));

        assert_eq!(access.get_block(0, 31, 15), Block::new(BlockType::DIRT));
        assert_eq!(access.into_sections().len(), 2);
    }

    #[test]
    fn structures_stay_inside_the_column() {
        let mut access = ColumnAccess::new(ColumnKey::new(0, 0), 16, 4);
        let mut rng = fastrand::Rng::with_seed(3);

        place_structure(&mut access, Point3::new(0, 10, 0), &mut rng, StructureId::Pyramid);

        assert_eq!(access.get_block(0, 10, 0), Block::new(BlockType::SAND));
        assert_eq!(access.get_block(6, 10, 6), Block::new(BlockType::SAND));
        assert_eq!(access.get_block(7, 10, 0), Block::AIR);
        assert_eq!(access.get_block(0, 16, 0), Block::new(BlockType::SAND));
    }
}
