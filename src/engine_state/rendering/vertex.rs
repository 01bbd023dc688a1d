//! Vertex data structures for section meshes.
//!
//! This module defines the vertex format handed to the renderer. The layout is
//! `#[repr(C)]` and `Pod` so a graphics backend can upload a side's vertex
//! slice with `bytemuck::cast_slice` without any conversion.

use cgmath::Point3;

/// A vertex of a section mesh.
///
/// # Memory Layout
/// - Position: 3x i32 (12 bytes), world block coordinates
/// - Texture Index: u32 (4 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// X coordinate in world space
    x: i32,
    /// Y coordinate in world space
    y: i32,
    /// Z coordinate in world space
    z: i32,
    /// Index of the texture in the texture array
    texture_index: u32,
    /// Texture coordinates in blocks along the face
    tex_coords: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex with the given parameters.
    ///
    /// # Arguments
    /// * `pos` - The 3D position of the vertex in world space
    /// * `texture_index` - Index of the texture in the texture array
    /// * `u` - U texture coordinate (0-255)
    /// * `v` - V texture coordinate (0-255)
    pub fn new(pos: Point3<i32>, texture_index: usize, u: u8, v: u8) -> Self {
        Vertex {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            texture_index: texture_index as u32,
            tex_coords: [u as f32, v as f32],
        }
    }

    pub fn position(&self) -> Point3<i32> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn texture_index(&self) -> u32 {
        self.texture_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_are_plain_bytes() {
        let vertices = [Vertex::new(Point3::new(-1, 2, 3), 4, 1, 0)];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);

        assert_eq!(bytes.len(), std::mem::size_of::<Vertex>());
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(vertices[0].position(), Point3::new(-1, 2, 3));
    }
}
