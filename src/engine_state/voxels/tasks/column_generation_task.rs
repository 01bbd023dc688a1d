//! # Column Generation Task
//!
//! This module defines the `ColumnGenerationTask`, which fills one registered
//! column with block data on a worker thread. The streaming scheduler
//! publishes one task per column of a load-area row and waits for the whole
//! row before moving on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::trace;

use crate::engine_state::{
    task_management::task::{Task, TaskOutcome},
    voxels::{
        column::Column,
        generator::{GenerationContext, TerrainGenerator},
        store::ColumnHandle,
    },
};

/// A task that generates a column's block data.
///
/// The blocks are produced without holding any lock and installed under the
/// column's write lock in one step, so a column either receives all of its
/// block data or none of it.
pub struct ColumnGenerationTask {
    /// The registered column to fill
    column: ColumnHandle,
    generator: Arc<dyn TerrainGenerator>,
    context: Arc<GenerationContext>,
    /// Cleared when the engine shuts down
    running: Arc<AtomicBool>,
}

impl ColumnGenerationTask {
    /// Creates a new column generation task.
    ///
    /// # Arguments
    /// * `column` - Handle to a column already registered in the chunk store
    /// * `generator` - The terrain generator to run
    /// * `context` - Section size, height and seed for this pass
    /// * `running` - The engine's running flag
    pub fn new(
        column: ColumnHandle,
        generator: Arc<dyn TerrainGenerator>,
        context: Arc<GenerationContext>,
        running: Arc<AtomicBool>,
    ) -> Self {
        ColumnGenerationTask {
            column,
            generator,
            context,
            running,
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Task for ColumnGenerationTask {
    fn process(self: Box<Self>) -> TaskOutcome {
        if !self.is_running() {
            return TaskOutcome::Cancelled;
        }
        if self.column.is_marked_for_deletion() || !self.column.get().needs_generation() {
            return TaskOutcome::Skipped;
        }

        let key = self.column.key();
        let generated = Column::generate_detached(key, self.generator.as_ref(), &self.context);

        // Shutdown may have started while generating; drop the blocks unseen.
        if !self.is_running() {
            return TaskOutcome::Cancelled;
        }

        if self.column.get_mut().install_generated(generated) {
            trace!("generated column {}", key);
            TaskOutcome::Completed
        } else {
            TaskOutcome::Skipped
        }
    }
}
