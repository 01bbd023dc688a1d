//! # Block Module
//!
//! This module provides the block identifiers stored in sections.
//! It includes block type definitions, block face handling, and the compact
//! block representation.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Maps each block type to its texture indices for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array contains 6 texture indices, one for each face in the order:
/// [Front, Back, Bottom, Top, Left, Right]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[usize; 6]; 8] = [
    [0, 0, 0, 0, 0, 0], // AIR (never meshed)
    [1, 1, 1, 1, 1, 1], // DIRT
    [2, 2, 1, 3, 2, 2], // GRASS (top: 3, bottom: 1, sides: 2)
    [0, 0, 5, 5, 0, 0], // WOOD (rings on top and bottom)
    [4, 4, 4, 4, 4, 4], // WHITE
    [6, 6, 6, 6, 6, 6], // STONE
    [7, 7, 7, 7, 7, 7], // SAND
    [8, 8, 8, 8, 8, 8], // LEAVES
];

/// A single voxel block.
///
/// Only the block id is stored; everything else about a block is looked up
/// from its type. The default block is air.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq, Hash, Default)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// The air block.
    pub const AIR: Block = Block { block_type: 0 };

    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// Decodes this block's type.
    pub fn block_type(&self) -> BlockType {
        BlockType::from_int(self.block_type)
    }

    pub fn is_air(&self) -> bool {
        !self.is_solid()
    }

    pub fn is_solid(&self) -> bool {
        self.block_type().is_solid()
    }

    /// Gets the texture indices for all faces of a block given its type as an integer.
    pub fn get_texture_indices_from_int(btype_int: BlockTypeSize) -> [usize; 6] {
        let block_type = BlockType::from_int(btype_int);
        BLOCK_TYPE_TO_TEXTURE_INDICES[block_type as usize]
    }
}

impl From<BlockType> for Block {
    fn from(block_type: BlockType) -> Self {
        Block::new(block_type)
    }
}
