use cgmath::Point3;

use super::meshing::Mesh;
use crate::engine_state::voxels::location::{ColumnKey, SectionKey};

/// Where the frame is being drawn from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewpoint {
    /// Observer position in world space
    pub position: Point3<f32>,
    /// Column the observer stands in
    pub observer_column: ColumnKey,
}

/// The graphics backend that turns finished section meshes into pixels.
///
/// Each frame the frame driver calls `process_section` once for every meshed
/// section that is still resident, then `render` once. The mesh is only
/// borrowed for the duration of the call; a backend that needs the data
/// later must copy it (for example into GPU buffers). Ordering, culling and
/// everything else about drawing is up to the implementation.
pub trait Renderer {
    fn process_section(&mut self, key: SectionKey, mesh: &Mesh);

    fn render(&mut self, viewpoint: &Viewpoint);
}
