//! Mesh data structures for section rendering.
//!
//! A section's mesh is split into six `MeshSide`s, one per face direction, so
//! a renderer can skip a whole direction that faces away from the viewer.

use cgmath::{Point3, Vector3};

use super::face::Face;
use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::block::{block_side::BlockSide, Block, BlockTypeSize};

/// Represents a single side of a mesh with its associated vertices and indices.
///
/// Each `MeshSide` corresponds to one of the six possible block faces and contains
/// the vertex and index data needed to render that face.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSide {
    /// The vertex data for this mesh side
    pub vertices: Vec<Vertex>,
    /// The index data for this mesh side
    pub indices: Vec<u32>,
    /// Which block side this mesh represents
    pub side: BlockSide,
}

impl MeshSide {
    /// Creates a new, empty `MeshSide` for the specified block side.
    pub fn new(side: BlockSide) -> Self {
        MeshSide {
            vertices: Vec::new(),
            indices: Vec::new(),
            side,
        }
    }

    /// Number of quads on this side.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

/// The complete mesh of one section, with all six sides.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Array of mesh sides, indexed by `BlockSide` enum values.
    pub mesh: [MeshSide; 6],
}

impl Mesh {
    /// Creates a new, empty mesh with all sides initialized.
    pub fn new() -> Self {
        let sides = BlockSide::all();
        Mesh {
            mesh: std::array::from_fn(|i| MeshSide::new(sides[i])),
        }
    }

    /// Appends one face, translating its section-local corners by `origin`.
    ///
    /// # Arguments
    /// * `face` - The face to add
    /// * `origin` - World block coordinate of the section's (0, 0, 0) corner
    pub fn add_face(&mut self, face: &Face, origin: Point3<i32>) {
        let side = &mut self.mesh[face.block_side as usize];
        let faces_on_side = side.face_count() as u32;
        side.vertices
            .extend(Self::generate_face_vertices(face, origin));
        side.indices
            .extend(Self::generate_face_indices(faces_on_side));
    }

    /// Generates vertex data for a single face of a block.
    ///
    /// # Returns
    /// The four corners of the face in world coordinates, ordered so that the
    /// indices from `generate_face_indices` form two triangles.
    pub fn generate_face_vertices(face: &Face, origin: Point3<i32>) -> [Vertex; 4] {
        let texture_indices =
            Block::get_texture_indices_from_int(face.block_type_int as BlockTypeSize);
        let texture_index = texture_indices[face.block_side as usize];
        let (u_offset, v_offset) = match face.block_side {
            BlockSide::FRONT => (face.lr.z - face.ll.z, face.ul.y - face.ll.y),
            BlockSide::BACK => (face.ll.z - face.lr.z, face.ul.y - face.ll.y),
            BlockSide::LEFT => (face.ll.x - face.lr.x, face.ul.y - face.ll.y),
            BlockSide::RIGHT => (face.lr.x - face.ll.x, face.ul.y - face.ll.y),
            BlockSide::TOP => (face.lr.z - face.ll.z, face.ul.x - face.ll.x),
            BlockSide::BOTTOM => (face.ll.z - face.lr.z, face.ul.x - face.ll.x),
        };
        let (u_offset, v_offset) = (u_offset as u8, v_offset as u8);

        [
            Vertex::new(to_world(origin, face.ll), texture_index, 0, v_offset),
            Vertex::new(to_world(origin, face.lr), texture_index, u_offset, v_offset),
            Vertex::new(to_world(origin, face.ul), texture_index, 0, 0),
            Vertex::new(to_world(origin, face.ur), texture_index, u_offset, 0),
        ]
    }

    /// Generates index data for a face, adjusted by the number of previously generated faces.
    ///
    /// # Returns
    /// Six indices forming the face's two triangles.
    pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
        let base = num_faces_generated * 4;
        [base, base + 1, base + 3, base, base + 3, base + 2]
    }

    /// Gets the number of vertices for each side of the mesh.
    pub fn get_vertex_lens(&self) -> [u64; 6] {
        std::array::from_fn(|i| self.mesh[i].vertices.len() as u64)
    }

    pub fn side(&self, side: BlockSide) -> &MeshSide {
        &self.mesh[side as usize]
    }

    /// Total number of quads across all sides.
    pub fn face_count(&self) -> usize {
        self.mesh.iter().map(MeshSide::face_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.iter().all(|side| side.vertices.is_empty())
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

fn to_world(origin: Point3<i32>, corner: Point3<usize>) -> Point3<i32> {
    origin + Vector3::new(corner.x as i32, corner.y as i32, corner.z as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn faces_land_on_their_side_with_rebased_indices() {
        let mut mesh = Mesh::new();
        let origin = Point3::new(16, 0, -16);

        mesh.add_face(&Face::new(0, 0, 0, BlockType::DIRT as usize, BlockSide::TOP), origin);
        mesh.add_face(&Face::new(1, 0, 0, BlockType::DIRT as usize, BlockSide::TOP), origin);

        let top = mesh.side(BlockSide::TOP);
        assert_eq!(top.face_count(), 2);
        assert_eq!(&top.indices[6..], &[4, 5, 7, 4, 7, 6]);
        assert_eq!(top.vertices[0].position(), Point3::new(16, 1, -16));
        assert_eq!(mesh.get_vertex_lens(), [0, 0, 0, 8, 0, 0]);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn texture_index_follows_the_side() {
        let top = Mesh::generate_face_vertices(
            &Face::new(0, 0, 0, BlockType::GRASS as usize, BlockSide::TOP),
            Point3::new(0, 0, 0),
        );
        let front = Mesh::generate_face_vertices(
            &Face::new(0, 0, 0, BlockType::GRASS as usize, BlockSide::FRONT),
            Point3::new(0, 0, 0),
        );

        assert_eq!(top[0].texture_index(), 3);
        assert_eq!(front[0].texture_index(), 2);
    }
}
