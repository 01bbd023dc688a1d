//! # Voxel Task System
//!
//! Background work units for the voxel world. Generation is the only work that
//! leaves the frame thread; meshing stays on it.

pub mod column_generation_task;

pub use column_generation_task::ColumnGenerationTask;
