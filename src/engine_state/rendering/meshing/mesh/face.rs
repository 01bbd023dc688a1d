use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-right, upper-left)
/// in section-local coordinates, plus the block type and the side of the block it belongs to.
/// The corners are wound so that the face is front-facing when seen from outside the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-right corner of the face in section coordinates
    pub lr: Point3<usize>,
    /// Lower-left corner of the face in section coordinates
    pub ll: Point3<usize>,
    /// Upper-right corner of the face in section coordinates
    pub ur: Point3<usize>,
    /// Upper-left corner of the face in section coordinates
    pub ul: Point3<usize>,
    /// The block type as an integer, used for texture mapping
    pub block_type_int: usize,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates a new face for a voxel at the given coordinates.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The coordinates of the voxel in section space
    /// * `block_type_int` - The type of the block, used for texture mapping
    /// * `block_side` - Which side of the block this face represents
    ///
    /// # Returns
    /// A new `Face` with its corners placed on the requested side of the voxel.
    pub fn new(i: usize, j: usize, k: usize, block_type_int: usize, block_side: BlockSide) -> Self {
        let (ll, lr, ul, ur) = match block_side {
            BlockSide::FRONT => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
            ),
            BlockSide::BACK => (
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
            ),
            BlockSide::BOTTOM => (
                Point3::new(i, j, k + 1),
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
            ),
            BlockSide::TOP => (
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i + 1, j + 1, k + 1),
            ),
            BlockSide::LEFT => (
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i, j + 1, k),
            ),
            BlockSide::RIGHT => (
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
            ),
        };

        Face {
            ll,
            lr,
            ul,
            ur,
            block_type_int,
            block_side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_lie_on_their_side_of_the_voxel() {
        let back = Face::new(2, 3, 4, 1, BlockSide::BACK);
        assert!([back.ll, back.lr, back.ul, back.ur].iter().all(|p| p.x == 3));

        let bottom = Face::new(2, 3, 4, 1, BlockSide::BOTTOM);
        assert!([bottom.ll, bottom.lr, bottom.ul, bottom.ur].iter().all(|p| p.y == 3));

        let left = Face::new(2, 3, 4, 1, BlockSide::LEFT);
        assert!([left.ll, left.lr, left.ul, left.ur].iter().all(|p| p.z == 4));
    }
}
