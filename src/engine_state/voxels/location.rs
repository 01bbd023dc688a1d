//! # Location Module
//!
//! Value keys used to address the world:
//!
//! * [`ColumnKey`] - one (x, z) column of sections, the chunk store's key
//! * [`SectionKey`] - one section; `y` selects the vertical slot in its column
//! * [`LocalBlockPos`] - one block inside a section
//!
//! World block coordinates are plain `Point3<i32>`, world-space positions are
//! `Point3<f32>`. All conversions use floor division so that negative
//! coordinates land in the right section: block `-1` lives in section `-1` at
//! local coordinate `section_size - 1`.

use std::fmt;

use cgmath::Point3;

use super::block::block_side::{Axis, BlockSide};

/// Identifies a chunk column in the horizontal plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ColumnKey {
    pub x: i32,
    pub z: i32,
}

impl ColumnKey {
    pub fn new(x: i32, z: i32) -> Self {
        ColumnKey { x, z }
    }

    /// Column containing a world-space position.
    pub fn from_world_position(position: Point3<f32>, section_size: usize) -> Self {
        Self::from_block(world_to_block(position), section_size)
    }

    /// Column containing a world block coordinate.
    pub fn from_block(block: Point3<i32>, section_size: usize) -> Self {
        let size = section_size as i32;
        ColumnKey {
            x: block.x.div_euclid(size),
            z: block.z.div_euclid(size),
        }
    }

    /// The horizontally adjacent column across `side`, or `None` for the
    /// vertical sides.
    pub fn neighbor(&self, side: BlockSide) -> Option<ColumnKey> {
        if side.axis() == Axis::Y {
            return None;
        }
        let offset = side.offset();
        Some(ColumnKey::new(self.x + offset.x, self.z + offset.z))
    }

    /// The section of this column at the given vertical slot.
    pub fn section(&self, slot: usize) -> SectionKey {
        SectionKey::new(self.x, slot as i32, self.z)
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Identifies one section in the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SectionKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SectionKey {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        SectionKey { x, y, z }
    }

    /// Section containing a world block coordinate.
    pub fn from_block(block: Point3<i32>, section_size: usize) -> Self {
        let size = section_size as i32;
        SectionKey {
            x: block.x.div_euclid(size),
            y: block.y.div_euclid(size),
            z: block.z.div_euclid(size),
        }
    }

    pub fn column(&self) -> ColumnKey {
        ColumnKey::new(self.x, self.z)
    }

    /// The vertical slot in the owning column, or `None` below the world floor.
    pub fn slot(&self) -> Option<usize> {
        usize::try_from(self.y).ok()
    }

    /// The adjacent section across `side`.
    pub fn neighbor(&self, side: BlockSide) -> SectionKey {
        let offset = side.offset();
        SectionKey::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }

    /// World block coordinate of local position (0, 0, 0).
    pub fn origin(&self, section_size: usize) -> Point3<i32> {
        let size = section_size as i32;
        Point3::new(self.x * size, self.y * size, self.z * size)
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Position of a block inside a section, each component in `[0, section_size)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LocalBlockPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalBlockPos {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        LocalBlockPos { x, y, z }
    }

    /// Local position of a world block coordinate within its section.
    pub fn from_block(block: Point3<i32>, section_size: usize) -> Self {
        let size = section_size as i32;
        LocalBlockPos {
            x: block.x.rem_euclid(size) as usize,
            y: block.y.rem_euclid(size) as usize,
            z: block.z.rem_euclid(size) as usize,
        }
    }

    /// Linear index into a dense section array (x fastest, then y, then z).
    pub fn index(&self, section_size: usize) -> usize {
        self.x + section_size * (self.y + section_size * self.z)
    }

    pub fn axis_value(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn is_within(&self, section_size: usize) -> bool {
        self.x < section_size && self.y < section_size && self.z < section_size
    }

    /// Section faces this position touches. Each axis is checked on its own,
    /// so a corner block reports three sides and an interior block none.
    pub fn boundary_sides(&self, section_size: usize) -> Vec<BlockSide> {
        let mut sides = Vec::new();
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let value = self.axis_value(axis);
            if value == 0 {
                sides.push(BlockSide::from_axis(axis, false));
            } else if value == section_size - 1 {
                sides.push(BlockSide::from_axis(axis, true));
            }
        }
        sides
    }
}

/// Splits a world block coordinate into its section and local position.
pub fn block_to_section(block: Point3<i32>, section_size: usize) -> (SectionKey, LocalBlockPos) {
    (
        SectionKey::from_block(block, section_size),
        LocalBlockPos::from_block(block, section_size),
    )
}

/// World block coordinate containing a world-space position.
pub fn world_to_block(position: Point3<f32>) -> Point3<i32> {
    Point3::new(
        position.x.floor() as i32,
        position.y.floor() as i32,
        position.z.floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_coordinates_floor_into_the_previous_section() {
        let (section, local) = block_to_section(Point3::new(-1, -17, 16), 16);
        assert_eq!(section, SectionKey::new(-1, -2, 1));
        assert_eq!(local, LocalBlockPos::new(15, 15, 0));
        assert_eq!(section.slot(), None);

        assert_eq!(
            ColumnKey::from_world_position(Point3::new(-0.5, 3.0, 15.9), 16),
            ColumnKey::new(-1, 0)
        );
        assert_eq!(
            ColumnKey::from_world_position(Point3::new(-16.0, 0.0, -16.01), 16),
            ColumnKey::new(-1, -2)
        );
    }

    #[test]
    fn section_origin_and_local_round_trip_to_the_block() {
        let block = Point3::new(37, 5, -3);
        let (section, local) = block_to_section(block, 16);
        let origin = section.origin(16);
        assert_eq!(
            Point3::new(
                origin.x + local.x as i32,
                origin.y + local.y as i32,
                origin.z + local.z as i32
            ),
            block
        );
    }

    #[test]
    fn boundary_sides_are_reported_per_axis() {
        assert!(LocalBlockPos::new(5, 5, 5).boundary_sides(16).is_empty());
        assert_eq!(
            LocalBlockPos::new(0, 3, 8).boundary_sides(16),
            vec![BlockSide::FRONT]
        );
        assert_eq!(
            LocalBlockPos::new(15, 0, 15).boundary_sides(16),
            vec![BlockSide::BACK, BlockSide::BOTTOM, BlockSide::RIGHT]
        );
    }

    #[test]
    fn horizontal_neighbors_only() {
        let key = ColumnKey::new(2, -3);
        assert_eq!(key.neighbor(BlockSide::BACK), Some(ColumnKey::new(3, -3)));
        assert_eq!(key.neighbor(BlockSide::LEFT), Some(ColumnKey::new(2, -4)));
        assert_eq!(key.neighbor(BlockSide::TOP), None);
    }

    #[test]
    fn world_positions_floor_to_blocks() {
        assert_eq!(world_to_block(Point3::new(-0.5, 30.2, 2.9)), Point3::new(-1, 30, 2));
        assert_eq!(world_to_block(Point3::new(-16.0, -0.01, 0.0)), Point3::new(-16, -1, 0));
    }
}
