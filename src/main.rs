//! # Headless Streaming Demo
//!
//! Walks an observer across generated terrain for a fixed number of frames
//! and logs what the engine does each frame.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```
//!
//! Without a config path the default configuration is used.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cgmath::Point3;
use log::{error, info};
use voxel_streamer::engine_state::{
    observer::{Observer, SharedObserver},
    rendering::{Mesh, Renderer, Viewpoint},
    voxels::{
        block::Block,
        location::{world_to_block, SectionKey},
    },
};
use voxel_streamer::{EngineConfig, EngineState};

const FRAME_COUNT: usize = 240;
const FRAME_TIME: Duration = Duration::from_millis(16);
/// Blocks the observer moves along +x each frame.
const WALK_SPEED: f32 = 1.5;

/// Counts what it is given instead of drawing it.
#[derive(Default)]
struct LoggingRenderer {
    sections: usize,
    faces: usize,
    frames: usize,
}

impl Renderer for LoggingRenderer {
    fn process_section(&mut self, _key: SectionKey, mesh: &Mesh) {
        self.sections += 1;
        self.faces += mesh.face_count();
    }

    fn render(&mut self, viewpoint: &Viewpoint) {
        self.frames += 1;
        if self.frames % 60 == 0 {
            info!(
                "frame {}: observer in column {}, {} sections, {} faces",
                self.frames, viewpoint.observer_column, self.sections, self.faces
            );
        }
        self.sections = 0;
        self.faces = 0;
    }
}

fn main() -> ExitCode {
    voxel_streamer::init_logging();

    let config = match env::args().nth(1) {
        Some(path) => match EngineConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("could not load {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    let observer = SharedObserver::new(Point3::new(0.0, 48.0, 0.0));
    let mut engine = match EngineState::with_default_terrain(config, Arc::new(observer.clone())) {
        Ok(engine) => engine,
        Err(err) => {
            error!("invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = LoggingRenderer::default();
    let mut position = observer.position();
    for frame in 0..FRAME_COUNT {
        position.x += WALK_SPEED;
        observer.set_position(position);

        // Carve out the block under the observer every few frames.
        if frame % 10 == 0 {
            let block = world_to_block(position);
            let below = Point3::new(block.x, 30, block.z);
            engine.submit_edit(below, Block::AIR);
        }

        let stats = engine.frame(&mut renderer);
        if stats.columns_reaped > 0 || stats.edits_dropped > 0 {
            info!(
                "frame {}: reaped {} columns, dropped {} edits",
                frame, stats.columns_reaped, stats.edits_dropped
            );
        }
        thread::sleep(FRAME_TIME);
    }

    engine.shutdown();
    info!("shut down with {} columns resident", engine.store().len());
    ExitCode::SUCCESS
}
