//! # Engine State Module
//!
//! The core engine module that owns the streamed voxel world.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container, tying the pieces below together
//! * `config` - Start-up configuration and its validation
//! * `streaming` - The background scheduler that loads and unloads columns
//! * `frame_driver` - Per-frame edits, reaping, meshing and drawing
//! * `rendering` - Section meshes and the renderer seam
//! * `task_management` - The generation worker pool
//! * `voxels` - Blocks, sections, columns and the chunk store
//! * `observer` - The position the world streams around
//!
//! ## Threads
//!
//! `EngineState::new` starts one background thread running the streaming
//! scheduler, which owns a small pool of generation workers. Everything else
//! runs on the thread calling [`EngineState::frame`]. Both sides share the
//! [`ChunkStore`]; the scheduler inserts columns and marks them for deletion,
//! the frame thread edits, meshes and reaps them.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cgmath::Point3;
//! use voxel_streamer::engine_state::{
//!     config::EngineConfig,
//!     observer::SharedObserver,
//!     rendering::{Mesh, Renderer, Viewpoint},
//!     voxels::location::SectionKey,
//!     EngineState,
//! };
//!
//! struct NullRenderer;
//!
//! impl Renderer for NullRenderer {
//!     fn process_section(&mut self, _key: SectionKey, _mesh: &Mesh) {}
//!     fn render(&mut self, _viewpoint: &Viewpoint) {}
//! }
//!
//! let observer = SharedObserver::new(Point3::new(0.0, 40.0, 0.0));
//! let mut engine = EngineState::with_default_terrain(EngineConfig::default(), Arc::new(observer.clone()))?;
//! engine.frame(&mut NullRenderer);
//! engine.shutdown();
//! # Ok::<(), voxel_streamer::engine_state::config::ConfigError>(())
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use cgmath::Point3;
use log::info;

pub mod config;
pub mod frame_driver;
pub mod observer;
pub mod rendering;
pub mod streaming;
pub mod task_management;
pub mod voxels;

use config::{ConfigError, EngineConfig};
use frame_driver::{FrameDriver, FrameStats};
use observer::Observer;
use rendering::{MeshQueue, Renderer};
use streaming::{SchedulerHandle, StreamingScheduler};
use voxels::{
    block::Block,
    edits::EditQueue,
    generator::{NoiseTerrainGenerator, TerrainGenerator},
    store::ChunkStore,
};

/// Surface height around which the default terrain undulates.
const DEFAULT_BASE_HEIGHT: i32 = 32;
/// Peak deviation of the default terrain from its base height.
const DEFAULT_AMPLITUDE: f64 = 12.0;

/// The main state container for the streaming engine.
///
/// Owns the chunk store, the edit queue, the frame driver and the handle to
/// the background scheduler. Dropping it shuts the scheduler down.
pub struct EngineState {
    config: EngineConfig,
    store: Arc<ChunkStore>,
    edits: EditQueue,
    observer: Arc<dyn Observer>,
    frame_driver: FrameDriver,
    scheduler: SchedulerHandle,
}

impl EngineState {
    /// Validates the configuration and starts streaming around `observer`.
    ///
    /// # Arguments
    /// * `config` - Engine configuration, checked with [`EngineConfig::validate`]
    /// * `generator` - Terrain generator for new columns
    /// * `observer` - The position the world streams around
    ///
    /// # Returns
    /// The running engine, or the reason the configuration was rejected.
    pub fn new(
        config: EngineConfig,
        generator: Arc<dyn TerrainGenerator>,
        observer: Arc<dyn Observer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let store = Arc::new(ChunkStore::new(
            config.section_size,
            config.max_sections_per_column,
        ));
        let edits = EditQueue::new();
        let mesh_queue = MeshQueue::new();
        let running = Arc::new(AtomicBool::new(true));

        let scheduler = StreamingScheduler::new(
            &config,
            store.clone(),
            generator,
            observer.clone(),
            mesh_queue.clone(),
            running,
        )
        .spawn();
        let frame_driver = FrameDriver::new(store.clone(), edits.clone(), mesh_queue);

        info!(
            "engine started: section size {}, render distance {}, {} workers",
            config.section_size, config.render_distance, config.worker_count
        );

        Ok(EngineState {
            config,
            store,
            edits,
            observer,
            frame_driver,
            scheduler,
        })
    }

    /// Starts the engine with the built-in noise terrain, seeded from the
    /// configuration.
    pub fn with_default_terrain(config: EngineConfig, observer: Arc<dyn Observer>) -> Result<Self, ConfigError> {
        let generator = NoiseTerrainGenerator::new(config.world_seed, DEFAULT_BASE_HEIGHT, DEFAULT_AMPLITUDE);
        Self::new(config, Arc::new(generator), observer)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.store
    }

    /// Queues a block change. It becomes visible in the mesh on the next frame.
    pub fn submit_edit(&self, position: Point3<i32>, block: Block) {
        self.edits.submit(position, block);
    }

    /// Block at a world block coordinate; anything not resident is air.
    pub fn get_block(&self, position: Point3<i32>) -> Block {
        self.store.get_block(position)
    }

    /// Runs one frame at the observer's current position.
    pub fn frame(&self, renderer: &mut dyn Renderer) -> FrameStats {
        self.frame_driver.frame(renderer, self.observer.position())
    }

    /// Stops the background scheduler and waits for it and its workers to
    /// exit. The store stays readable afterwards.
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
    }

    pub fn is_running(&self) -> bool {
        !self.scheduler.is_finished()
    }
}
