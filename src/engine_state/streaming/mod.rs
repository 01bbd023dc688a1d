//! # Streaming Scheduler
//!
//! The background loop that keeps the set of resident columns centred on the
//! observer.
//!
//! ## One iteration
//!
//! 1. Find the column the observer stands in
//! 2. Build the *load area* (half-width `load_distance`) and the *keep area*
//!    (half-width `render_distance + keep_margin`) around it
//! 3. Register every column of the load area and generate the ones without
//!    block data, one row at a time on the worker pool; each row is a batch
//!    that is joined before the next row starts
//! 4. Ramp `load_distance` one step toward `render_distance`
//! 5. Mark every column outside the keep area for deletion, and queue every
//!    kept column that has block data but no mesh for meshing on the frame
//!    thread
//!
//! ## Shutdown
//!
//! The running flag is checked before every row and by every generation task
//! before it starts, so a shutdown request is honoured within one column's
//! worth of work. [`SchedulerHandle::shutdown`] clears the flag and joins the
//! background thread, which in turn joins its workers.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, trace};
use web_time::Instant;

mod area;

pub use area::RenderArea;

use crate::engine_state::{
    config::EngineConfig,
    observer::Observer,
    rendering::MeshQueue,
    task_management::{task::Task, TaskManager},
    voxels::{
        generator::{GenerationContext, TerrainGenerator},
        location::ColumnKey,
        store::ChunkStore,
        tasks::ColumnGenerationTask,
    },
};

/// What one scheduler iteration did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IterationReport {
    pub observer_column: ColumnKey,
    /// The load radius this iteration generated with.
    pub load_distance: u32,
    pub columns_generated: usize,
    pub columns_marked: usize,
    pub meshes_requested: usize,
    /// `true` if shutdown interrupted the iteration.
    pub cancelled: bool,
}

impl IterationReport {
    fn new(observer_column: ColumnKey, load_distance: u32) -> Self {
        IterationReport {
            observer_column,
            load_distance,
            columns_generated: 0,
            columns_marked: 0,
            meshes_requested: 0,
            cancelled: false,
        }
    }

    /// `true` when the iteration found nothing to generate or mark.
    pub fn is_idle(&self) -> bool {
        self.columns_generated == 0 && self.columns_marked == 0 && self.meshes_requested == 0
    }
}

/// Drives column generation and unloading around the observer.
pub struct StreamingScheduler {
    store: Arc<ChunkStore>,
    generator: Arc<dyn TerrainGenerator>,
    observer: Arc<dyn Observer>,
    mesh_queue: MeshQueue,
    task_manager: TaskManager,
    running: Arc<AtomicBool>,
    load_distance: u32,
    config: EngineConfig,
}

impl StreamingScheduler {
    /// Creates a scheduler and starts its generation workers.
    ///
    /// # Arguments
    /// * `config` - A validated engine configuration
    /// * `store` - The chunk store to populate
    /// * `generator` - Terrain generator run for every new column
    /// * `observer` - The position the world streams around
    /// * `mesh_queue` - Where columns needing a mesh are reported
    /// * `running` - Cleared to stop the scheduler
    pub fn new(
        config: &EngineConfig,
        store: Arc<ChunkStore>,
        generator: Arc<dyn TerrainGenerator>,
        observer: Arc<dyn Observer>,
        mesh_queue: MeshQueue,
        running: Arc<AtomicBool>,
    ) -> Self {
        StreamingScheduler {
            store,
            generator,
            observer,
            mesh_queue,
            task_manager: TaskManager::new(config.worker_count),
            running,
            load_distance: config.starting_load_distance(),
            config: config.clone(),
        }
    }

    /// The load radius the next iteration will use.
    pub fn load_distance(&self) -> u32 {
        self.load_distance
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs one full scheduler iteration on the calling thread.
    pub fn step(&mut self) -> IterationReport {
        let start = Instant::now();
        let section_size = self.config.section_size;
        let observer_column = ColumnKey::from_world_position(self.observer.position(), section_size);
        let load_area = RenderArea::around(observer_column, self.load_distance);
        let keep_area = RenderArea::around(observer_column, self.config.keep_distance());
        let mut report = IterationReport::new(observer_column, self.load_distance);

        let context = Arc::new(GenerationContext::new(
            section_size,
            self.config.max_sections_per_column,
            self.config.world_seed,
            observer_column,
        ));

        for row in load_area.rows() {
            if !self.is_running() {
                report.cancelled = true;
                return report;
            }

            let tasks: Vec<Box<dyn Task>> = row
                .into_iter()
                .filter_map(|key| self.generation_task(key, &context))
                .collect();
            if tasks.is_empty() {
                continue;
            }

            let batch = self.task_manager.run_batch(tasks);
            report.columns_generated += batch.completed;
            if batch.cancelled > 0 {
                report.cancelled = true;
                return report;
            }
        }

        if self.load_distance < self.config.render_distance {
            self.load_distance += 1;
            debug!(
                "load distance ramped to {} of {}",
                self.load_distance, self.config.render_distance
            );
        }

        for handle in self.store.snapshot() {
            if handle.is_marked_for_deletion() {
                continue;
            }
            if !keep_area.contains(handle.key()) {
                if handle.mark_for_deletion() {
                    report.columns_marked += 1;
                }
                continue;
            }
            let column = handle.get();
            if column.has_block_data() && !column.has_mesh() && self.mesh_queue.request(handle.key()) {
                report.meshes_requested += 1;
            }
        }

        if report.is_idle() {
            trace!("scheduler pass around {} found no work", observer_column);
        } else {
            debug!(
                "scheduler pass around {}: generated {}, marked {}, queued {} for meshing in {:?}",
                observer_column,
                report.columns_generated,
                report.columns_marked,
                report.meshes_requested,
                start.elapsed()
            );
        }
        report
    }

    /// Registers `key` and returns a task generating it, unless it already
    /// has block data or is on its way out.
    fn generation_task(&self, key: ColumnKey, context: &Arc<GenerationContext>) -> Option<Box<dyn Task>> {
        let (handle, _) = self.store.insert_if_absent(key);
        if handle.is_marked_for_deletion() || !handle.get().needs_generation() {
            return None;
        }
        Some(Box::new(ColumnGenerationTask::new(
            handle,
            self.generator.clone(),
            context.clone(),
            self.running.clone(),
        )))
    }

    /// Moves the scheduler onto its own thread and loops `step` until the
    /// running flag is cleared. Idle passes are followed by a pause of
    /// `scan_interval_ms`.
    pub fn spawn(self) -> SchedulerHandle {
        let running = self.running.clone();
        let thread = thread::Builder::new()
            .name("streaming-scheduler".to_string())
            .spawn(move || self.run())
            .expect("failed to spawn streaming scheduler thread");

        SchedulerHandle {
            running,
            thread: Some(thread),
        }
    }

    fn run(mut self) {
        info!(
            "streaming scheduler started, render distance {}",
            self.config.render_distance
        );
        let scan_interval = Duration::from_millis(self.config.scan_interval_ms);

        while self.is_running() {
            let report = self.step();
            if report.is_idle() && self.is_running() {
                thread::park_timeout(scan_interval);
            }
        }

        info!("streaming scheduler stopped");
    }
}

/// Owner of the background scheduler thread.
///
/// Dropping the handle shuts the scheduler down.
pub struct SchedulerHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Clears the running flag and blocks until the scheduler thread and its
    /// workers have exited. Calling it again does nothing.
    ///
    /// # Panics
    /// Re-raises a panic that happened on the scheduler thread.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        let Some(thread) = self.thread.take() else {
            return;
        };
        thread.thread().unpark();

        if let Err(payload) = thread.join() {
            if !thread::panicking() {
                panic::resume_unwind(payload);
            }
        }
        debug!("streaming scheduler joined");
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::observer::SharedObserver;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::generator::FlatTerrainGenerator;
    use cgmath::Point3;

    fn scheduler(render_distance: u32, initial: u32) -> (StreamingScheduler, Arc<ChunkStore>, SharedObserver) {
        scheduler_with(EngineConfig {
            render_distance,
            initial_load_distance: initial,
            worker_count: 2,
            max_sections_per_column: 4,
            ..EngineConfig::default()
        })
    }

    fn scheduler_with(config: EngineConfig) -> (StreamingScheduler, Arc<ChunkStore>, SharedObserver) {
        let store = Arc::new(ChunkStore::new(config.section_size, config.max_sections_per_column));
        let observer = SharedObserver::new(Point3::new(8.0, 10.0, 8.0));
        let scheduler = StreamingScheduler::new(
            &config,
            store.clone(),
            Arc::new(FlatTerrainGenerator::new(4, BlockType::GRASS)),
            Arc::new(observer.clone()),
            MeshQueue::new(),
            Arc::new(AtomicBool::new(true)),
        );
        (scheduler, store, observer)
    }

    #[test]
    fn load_distance_ramps_by_one_and_never_passes_render_distance() {
        let (mut scheduler, store, _) = scheduler(3, 0);
        let mut previous = scheduler.load_distance();

        for _ in 0..6 {
            let report = scheduler.step();
            assert_eq!(report.load_distance, previous);
            assert!(scheduler.load_distance() <= 3);
            assert!(scheduler.load_distance() <= previous + 1);

            let side = 2 * report.load_distance as usize + 1;
            assert!(store.len() >= side * side);
            previous = scheduler.load_distance();
        }

        assert_eq!(scheduler.load_distance(), 3);
        assert_eq!(store.len(), 49);
    }

    #[test]
    fn every_column_in_the_load_area_gets_block_data() {
        let (mut scheduler, store, _) = scheduler(1, 1);

        let report = scheduler.step();

        assert_eq!(report.columns_generated, 9);
        for key in RenderArea::around(ColumnKey::new(0, 0), 1).keys() {
            let handle = store.lookup(key).unwrap();
            assert!(handle.get().has_block_data(), "column {key} has no block data");
        }
        assert_eq!(report.meshes_requested, 9);
        assert_eq!(scheduler.step().columns_generated, 0);
    }

    #[test]
    fn columns_outside_the_keep_area_are_marked_not_removed() {
        let (mut scheduler, store, observer) = scheduler(1, 1);
        scheduler.step();

        observer.set_position(Point3::new(16.0 * 10.0, 10.0, 0.0));
        let report = scheduler.step();

        assert_eq!(report.observer_column, ColumnKey::new(10, 0));
        assert_eq!(report.columns_marked, 9);
        assert!(store.contains(ColumnKey::new(0, 0)));
        assert!(store.lookup_live(ColumnKey::new(0, 0)).is_none());
        assert_eq!(store.reap_deleted(), 9);
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn keep_margin_holds_columns_just_outside_the_render_distance() {
        let (mut scheduler, store, observer) = scheduler_with(EngineConfig {
            render_distance: 1,
            initial_load_distance: 1,
            keep_margin: 1,
            worker_count: 2,
            max_sections_per_column: 4,
            ..EngineConfig::default()
        });
        scheduler.step();
        assert_eq!(store.len(), 9);

        observer.set_position(Point3::new(16.0 + 8.0, 10.0, 8.0));
        let report = scheduler.step();

        assert_eq!(report.columns_generated, 3);
        assert_eq!(report.columns_marked, 0);
        for z in -1..=1 {
            assert!(store.lookup_live(ColumnKey::new(-1, z)).is_some());
        }

        observer.set_position(Point3::new(2.0 * 16.0 + 8.0, 10.0, 8.0));
        let report = scheduler.step();

        assert_eq!(report.columns_marked, 3);
        for z in -1..=1 {
            assert!(store.lookup_live(ColumnKey::new(-1, z)).is_none());
            assert!(store.lookup_live(ColumnKey::new(0, z)).is_some());
        }
        assert_eq!(store.reap_deleted(), 3);
        assert_eq!(store.len(), 12);
    }

    #[test]
    fn without_a_keep_margin_the_trailing_row_is_marked_at_once() {
        let (mut scheduler, store, observer) = scheduler(1, 1);
        scheduler.step();

        observer.set_position(Point3::new(16.0 + 8.0, 10.0, 8.0));
        let report = scheduler.step();

        assert_eq!(report.columns_marked, 3);
        assert!(store.lookup_live(ColumnKey::new(-1, 0)).is_none());
    }

    #[test]
    fn a_cleared_running_flag_stops_generation_before_the_next_row() {
        let (mut scheduler, store, _) = scheduler(2, 2);
        scheduler.running.store(false, Ordering::Release);

        let report = scheduler.step();

        assert!(report.cancelled);
        assert_eq!(report.columns_generated, 0);
        assert!(store.is_empty());
        assert_eq!(scheduler.load_distance(), 2);
    }

    #[test]
    fn spawned_scheduler_joins_on_shutdown() {
        let (scheduler, store, _) = scheduler(1, 1);
        let mut handle = scheduler.spawn();

        let deadline = Instant::now() + Duration::from_secs(10);
        while store.len() < 9 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        handle.shutdown();

        assert!(handle.is_finished());
        assert_eq!(store.len(), 9);
        handle.shutdown();
    }
}
