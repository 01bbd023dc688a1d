//! # Task System Core Traits
//!
//! A `Task` is one self-contained unit of background work. Tasks own
//! everything they need (usually a few `Arc` handles), run on a worker thread,
//! and report a `TaskOutcome` back to whoever published them.
//!
//! ## Task Lifecycle
//! 1. A `Task` is handed to `TaskManager::run_batch()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The outcome is sent back and tallied in the batch report
//!
//! ## Cancellation
//! Tasks are expected to check the engine's running flag before starting any
//! real work and to return `TaskOutcome::Cancelled` without side effects when
//! it is cleared.

/// How a task finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task did its work.
    Completed,
    /// There was nothing left to do (for example the work was already done).
    Skipped,
    /// Shutdown was requested before the task started its work.
    Cancelled,
}

/// A trait representing a unit of work that can be executed on a worker.
///
/// # Implementation Guidelines
/// - Must be `Send` to be transferred between threads
/// - Should either finish its work completely or leave no trace
/// - Should avoid holding locks for longer than the write it needs
pub trait Task: Send {
    /// Processes the task on a worker thread.
    fn process(self: Box<Self>) -> TaskOutcome;
}
