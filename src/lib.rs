#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streamer
//!
//! The chunk lifecycle and streaming core of a voxel engine: it keeps a
//! bounded working set of block columns resident around a moving observer,
//! generates them in the background, meshes them on the frame thread and
//! applies gameplay edits in batches.
//!
//! ## Key Modules
//!
//! * `core` - Shared-state handles used throughout the engine
//! * `engine_state` - The engine itself: chunk store, streaming scheduler,
//!   frame driver, meshing and configuration
//!
//! ## Architecture
//!
//! * A background scheduler loads columns around the observer, ramping its
//!   load radius up to the configured render distance, and marks columns that
//!   fall out of range for deletion
//! * Column generation runs on a small worker pool, one row of the load area
//!   at a time
//! * The frame thread applies edits, reaps marked columns, meshes new ones and
//!   hands every section mesh to an external renderer
//! * Terrain generation, the observer and the renderer are traits, so the
//!   engine runs headless
//!
//! ## Usage
//!
//! ```no_run
//! voxel_streamer::init_logging();
//! ```
//!
//! See [`engine_state::EngineState`] for starting the engine.

use log::info;

pub mod core;
pub mod engine_state;

pub use engine_state::{config::EngineConfig, EngineState};

/// Installs the `env_logger` backend, writing to stdout and filtered by the
/// `RUST_LOG` environment variable. Call once, from the binary.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
}
