//! # Block Side Module
//!
//! This module defines the six faces of a voxel block. The same enum names the
//! six faces of a section, which is what the mesher and the edit propagation
//! use to find neighbouring sections.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value so meshes can store their
/// per-face buffers in a fixed-size array indexed by side.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing negative X)
    FRONT = 0,

    /// The back face (facing positive X)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative Z)
    LEFT = 4,

    /// The right face (facing positive Z)
    RIGHT = 5,
}

/// The three axes a block side can be perpendicular to.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Unit offset from a block to the neighbour this side faces.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(-1, 0, 0),
            BlockSide::BACK => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(0, 0, -1),
            BlockSide::RIGHT => Vector3::new(0, 0, 1),
        }
    }

    /// The side facing the opposite direction.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// The axis this side is perpendicular to.
    pub fn axis(self) -> Axis {
        match self {
            BlockSide::FRONT | BlockSide::BACK => Axis::X,
            BlockSide::BOTTOM | BlockSide::TOP => Axis::Y,
            BlockSide::LEFT | BlockSide::RIGHT => Axis::Z,
        }
    }

    /// Whether this side faces the positive direction of its axis.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::BACK | BlockSide::TOP | BlockSide::RIGHT)
    }

    /// Returns the side whose face lies on `axis`, pointing in the given direction.
    pub fn from_axis(axis: Axis, positive: bool) -> BlockSide {
        match (axis, positive) {
            (Axis::X, false) => BlockSide::FRONT,
            (Axis::X, true) => BlockSide::BACK,
            (Axis::Y, false) => BlockSide::BOTTOM,
            (Axis::Y, true) => BlockSide::TOP,
            (Axis::Z, false) => BlockSide::LEFT,
            (Axis::Z, true) => BlockSide::RIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_sides_cancel_out() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.offset() + side.opposite().offset(), Vector3::new(0, 0, 0));
            assert_eq!(side.axis(), side.opposite().axis());
            assert_eq!(BlockSide::from_axis(side.axis(), side.is_positive()), side);
        }
    }
}
