//! # Block Type Module
//!
//! This module defines the block identifiers the streaming core stores.
//! The full block catalogue (names, physics, textures) lives outside the core;
//! here a block type only needs a stable integer id and a notion of solidity
//! for face culling.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates the block types known to the engine.
///
/// The `FromPrimitive` derive allows conversion from the compact integer form
/// stored in sections.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// An air block, which is non-solid and transparent. The default for every
    /// freshly grown section.
    AIR,

    /// A basic dirt block.
    DIRT,

    /// A grass block with different textures on top and sides.
    GRASS,

    /// A wooden log block, used for tree trunks.
    WOOD,

    /// A plain white block, often used for testing.
    WHITE,

    /// Stone, the bulk of generated terrain below the surface.
    STONE,

    /// Sand, used by desert structures.
    SAND,

    /// Tree foliage.
    LEAVES,
}

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// Unknown ids map to `AIR` so a corrupted or foreign id never takes
    /// down the mesher.
    pub fn from_int(btype: BlockTypeSize) -> Self {
        num::FromPrimitive::from_u8(btype).unwrap_or(BlockType::AIR)
    }

    /// Whether blocks of this type occlude neighbouring faces.
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_decode_to_air() {
        assert_eq!(BlockType::from_int(1), BlockType::DIRT);
        assert_eq!(BlockType::from_int(7), BlockType::LEAVES);
        assert_eq!(BlockType::from_int(200), BlockType::AIR);
        assert!(!BlockType::from_int(200).is_solid());
    }
}
