//! Mesh generation for sections.
//!
//! This module turns a section's block array into a [`Mesh`]. Each solid block
//! emits one quad per side whose neighbouring block is air. Blocks on the
//! section boundary look across it through [`SectionNeighbors`], a set of
//! read-only boundary planes copied from the six adjacent sections, so faces
//! against a solid neighbour are culled even when the neighbour lives in
//! another column.
//!
//! # Locking
//! Meshing only ever holds one column lock at a time. The boundary planes of
//! the horizontal neighbours are copied under short read locks first, then the
//! column being meshed is write-locked to replace its section meshes. Meshing
//! runs on the frame thread only.
//!
//! # Architecture
//! - [`build_section_mesh`]: pure function from blocks and neighbour planes to a mesh
//! - [`remesh_sections`]: rebuilds selected slots of one resident column
//! - [`mesh_column`]: rebuilds every slot of one resident column
//! - [`MeshQueue`]: columns the streaming scheduler wants meshed

use log::trace;
use web_time::Instant;

mod mesh;
mod mesh_queue;
mod neighbors;

pub use mesh::*;
pub use mesh_queue::MeshQueue;
pub use neighbors::SectionNeighbors;

use crate::engine_state::voxels::{
    block::block_side::BlockSide,
    location::{LocalBlockPos, SectionKey},
    section::Section,
    store::{ChunkStore, ColumnHandle},
};

const HORIZONTAL_SIDES: [BlockSide; 4] = [
    BlockSide::FRONT,
    BlockSide::BACK,
    BlockSide::LEFT,
    BlockSide::RIGHT,
];

/// Builds the mesh of one section from its blocks and its neighbours'
/// boundary planes.
///
/// Pure: the result depends only on the arguments, so rebuilding an unchanged
/// section yields an identical mesh.
///
/// # Arguments
/// * `section` - The section to mesh
/// * `key` - Where the section sits in the world, used to place vertices
/// * `neighbors` - Boundary planes of the adjacent sections
pub fn build_section_mesh(section: &Section, key: SectionKey, neighbors: &SectionNeighbors) -> Mesh {
    let size = section.size();
    let origin = key.origin(size);
    let mut mesh = Mesh::new();

    for (pos, block) in section.solid_blocks() {
        for side in BlockSide::all() {
            if is_face_hidden(section, neighbors, pos, side) {
                continue;
            }
            let face = Face::new(pos.x, pos.y, pos.z, block.block_type as usize, side);
            mesh.add_face(&face, origin);
        }
    }

    mesh
}

/// Whether the block across `side` from `pos` is solid.
fn is_face_hidden(section: &Section, neighbors: &SectionNeighbors, pos: LocalBlockPos, side: BlockSide) -> bool {
    let size = section.size();
    let value = pos.axis_value(side.axis());
    let on_boundary = if side.is_positive() {
        value == size - 1
    } else {
        value == 0
    };

    if on_boundary {
        return neighbors.is_solid(side, pos, size);
    }

    let offset = side.offset();
    section.is_block_solid(
        (pos.x as i32 + offset.x) as usize,
        (pos.y as i32 + offset.y) as usize,
        (pos.z as i32 + offset.z) as usize,
    )
}

/// Rebuilds the meshes of the given slots of one column. Slots the column
/// does not have are skipped. Returns how many sections were meshed.
///
/// # Panics
/// Panics if the column has no block data yet.
pub fn remesh_sections(store: &ChunkStore, handle: &ColumnHandle, slots: &[usize]) -> usize {
    let start = Instant::now();
    let key = handle.key();
    let mut neighbors: Vec<(usize, SectionNeighbors)> = slots
        .iter()
        .map(|&slot| (slot, SectionNeighbors::none()))
        .collect();

    for side in HORIZONTAL_SIDES {
        let Some(neighbor) = key.neighbor(side).and_then(|k| store.lookup(k)) else {
            continue;
        };
        let neighbor_column = neighbor.get();
        for (slot, planes) in neighbors.iter_mut() {
            if let Some(section) = neighbor_column.get_section(*slot) {
                planes.set(side, section.boundary_plane(side.opposite()));
            }
        }
    }

    let mut column = handle.get_mut();
    assert!(
        column.has_block_data(),
        "column {} meshed before it has block data",
        key
    );

    for (slot, planes) in neighbors.iter_mut() {
        if let Some(below) = slot.checked_sub(1).and_then(|s| column.get_section(s)) {
            planes.set(BlockSide::BOTTOM, below.boundary_plane(BlockSide::TOP));
        }
        if let Some(above) = column.get_section(*slot + 1) {
            planes.set(BlockSide::TOP, above.boundary_plane(BlockSide::BOTTOM));
        }
    }

    let mut meshed = 0;
    for (slot, planes) in &neighbors {
        if let Some(section) = column.get_section_mut(*slot) {
            section.generate_mesh(key.section(*slot), planes);
            meshed += 1;
        }
    }
    column.mark_meshed();

    trace!(
        "meshed {} sections of column {} in {:?}",
        meshed,
        key,
        start.elapsed()
    );
    meshed
}

/// Rebuilds every section of one column.
///
/// # Panics
/// Panics if the column has no block data yet.
pub fn mesh_column(store: &ChunkStore, handle: &ColumnHandle) -> usize {
    let slots: Vec<usize> = (0..handle.get().section_count()).collect();
    remesh_sections(store, handle, &slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{block_type::BlockType, Block};
    use crate::engine_state::voxels::generator::{FlatTerrainGenerator, GenerationContext};
    use crate::engine_state::voxels::location::ColumnKey;

    fn generated_store(keys: &[ColumnKey]) -> ChunkStore {
        let store = ChunkStore::new(16, 4);
        let generator = FlatTerrainGenerator::new(4, BlockType::DIRT);
        let context = GenerationContext::new(16, 4, 0, ColumnKey::default());
        for &key in keys {
            let (handle, _) = store.insert_if_absent(key);
            handle.get_mut().try_gen(&generator, &context);
        }
        store
    }

    #[test]
    fn lone_slab_shows_every_outer_face() {
        let store = generated_store(&[ColumnKey::new(0, 0)]);
        let handle = store.lookup(ColumnKey::new(0, 0)).unwrap();

        assert_eq!(mesh_column(&store, &handle), 1);

        let column = handle.get();
        let mesh = column.get_section(0).and_then(Section::mesh).unwrap();
        assert_eq!(mesh.side(BlockSide::TOP).face_count(), 256);
        assert_eq!(mesh.side(BlockSide::BOTTOM).face_count(), 256);
        assert_eq!(mesh.side(BlockSide::BACK).face_count(), 64);
        assert_eq!(mesh.face_count(), 768);
        assert!(column.has_mesh());
    }

    #[test]
    fn faces_against_a_resident_neighbour_are_culled() {
        let store = generated_store(&[ColumnKey::new(0, 0), ColumnKey::new(1, 0)]);
        let handle = store.lookup(ColumnKey::new(0, 0)).unwrap();

        mesh_column(&store, &handle);

        let column = handle.get();
        let mesh = column.get_section(0).and_then(Section::mesh).unwrap();
        assert_eq!(mesh.side(BlockSide::BACK).face_count(), 0);
        assert_eq!(mesh.side(BlockSide::FRONT).face_count(), 64);
        assert_eq!(mesh.face_count(), 704);
    }

    #[test]
    fn meshing_twice_yields_the_same_mesh() {
        let store = generated_store(&[ColumnKey::new(0, 0), ColumnKey::new(0, 1)]);
        let handle = store.lookup(ColumnKey::new(0, 0)).unwrap();
        handle
            .get_mut()
            .set_block(1, LocalBlockPos::new(3, 0, 3), Block::new(BlockType::WOOD));

        mesh_column(&store, &handle);
        let first: Vec<Mesh> = handle.get().sections().filter_map(|(_, s)| s.mesh().cloned()).collect();
        mesh_column(&store, &handle);
        let second: Vec<Mesh> = handle.get().sections().filter_map(|(_, s)| s.mesh().cloned()).collect();

        assert_eq!(first, second);
        assert_eq!(handle.get().get_section(0).map(Section::mesh_revision), Some(2));
    }

    #[test]
    fn stacked_sections_cull_across_the_vertical_boundary() {
        let store = generated_store(&[ColumnKey::new(0, 0)]);
        let handle = store.lookup(ColumnKey::new(0, 0)).unwrap();
        handle
            .get_mut()
            .set_block(0, LocalBlockPos::new(5, 15, 5), Block::new(BlockType::STONE));
        handle
            .get_mut()
            .set_block(1, LocalBlockPos::new(5, 0, 5), Block::new(BlockType::STONE));

        mesh_column(&store, &handle);

        let column = handle.get();
        let lower = column.get_section(0).and_then(Section::mesh).unwrap();
        let upper = column.get_section(1).and_then(Section::mesh).unwrap();
        assert_eq!(lower.side(BlockSide::TOP).face_count(), 256);
        assert_eq!(upper.side(BlockSide::BOTTOM).face_count(), 0);
        assert_eq!(upper.face_count(), 5);
    }

    #[test]
    #[should_panic(expected = "before it has block data")]
    fn meshing_without_block_data_panics() {
        let store = ChunkStore::new(16, 4);
        let (handle, _) = store.insert_if_absent(ColumnKey::new(0, 0));
        mesh_column(&store, &handle);
    }
}
