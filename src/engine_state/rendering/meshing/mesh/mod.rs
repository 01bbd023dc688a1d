//! Mesh data for section rendering.
//!
//! # Architecture
//! - [`Mesh`]: a section's vertices and indices, split by face direction
//! - [`Face`]: one visible quad of a voxel, in section-local coordinates
//!
//! Faces are emitted per visible voxel side; no faces are merged.

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
