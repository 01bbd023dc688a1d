//! Rendering-side state of the engine.
//!
//! This module owns everything between block data and the external graphics
//! backend: building section meshes, the vertex format, and the [`Renderer`]
//! seam through which finished meshes leave the engine.

pub mod meshing;
mod renderer;
mod vertex;

// Re-export commonly used types
pub use meshing::{Mesh, MeshQueue};
pub use renderer::{Renderer, Viewpoint};
pub use vertex::Vertex;
