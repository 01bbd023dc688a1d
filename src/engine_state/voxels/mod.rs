//! # Voxel World Data
//!
//! This module contains the data side of the streaming engine: block ids,
//! sections and columns, the concurrent chunk store that holds them, terrain
//! generation and the queue of pending gameplay edits.
//!
//! ## Architecture
//!
//! * **Block**: block ids and the six block sides
//! * **Location**: column, section and local block coordinates and the
//!   transforms between them and world space
//! * **Section**: a fixed-size cube of blocks plus its mesh
//! * **Column**: the vertical stack of sections at one (x, z), the unit of
//!   streaming
//! * **Store**: the concurrent registry of resident columns
//! * **Generator**: the terrain generation seam and the built-in generators
//! * **Edits**: pending block changes, applied once per frame
//! * **Tasks**: the column generation work unit run on the worker pool
//!
//! ## Thread Safety
//!
//! * The store map and every column have their own `RwLock`
//! * Generation builds blocks off-lock and installs them in one write
//! * Meshing and edits happen on the frame thread only

pub mod block;
pub mod column;
pub mod edits;
pub mod generator;
pub mod location;
pub mod section;
pub mod store;
pub mod tasks;
