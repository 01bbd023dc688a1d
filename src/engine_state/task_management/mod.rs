//! # Task Management System
//!
//! A fixed pool of worker threads used by the streaming scheduler to generate
//! columns in parallel.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: owns the workers and distributes tasks to them
//! - `Task`: a unit of work executed on a worker
//! - `TaskChannel`: the per-worker task channel and join handle
//!
//! Each worker has its own task channel and accepts at most
//! `MAX_TASKS_IN_FLIGHT` tasks at a time; anything beyond that waits in the
//! manager's queue and is handed out round-robin as workers free up. All
//! workers report back through one shared result channel.
//!
//! ## Batches
//!
//! `run_batch()` is a synchronous parallel-for: it publishes a set of tasks and
//! blocks until every one of them has reported back. The scheduler uses one
//! batch per row of its load area, which bounds the number of columns being
//! generated at once by the row width and the worker count.
//!
//! ## Shutdown
//!
//! Dropping the `TaskManager` closes every task channel and joins the workers,
//! so no worker outlives the manager.

pub mod task;

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, info};
use task::{Task, TaskOutcome};

/// A worker thread and the channel used to send it tasks.
#[derive(Debug)]
struct TaskChannel {
    task_sender: Sender<Box<dyn Task>>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

/// What a worker reports after each task.
enum WorkerMessage {
    Finished { channel: usize, outcome: TaskOutcome },
    Panicked { channel: usize, message: String },
}

/// Tally of task outcomes for one batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: usize,
    pub skipped: usize,
    pub cancelled: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Completed => self.completed += 1,
            TaskOutcome::Skipped => self.skipped += 1,
            TaskOutcome::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.skipped + self.cancelled
    }
}

/// Manages a pool of worker threads and coordinates task execution.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    result_receiver: Receiver<WorkerMessage>,
    queued_tasks: VecDeque<Box<dyn Task>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Panics
    /// Panics if `num_workers` is zero or a thread cannot be spawned.
    pub fn new(num_workers: usize) -> Self {
        assert!(num_workers > 0, "a task manager needs at least one worker");

        info!(
            "Starting {} workers, available parallelism: {:?}",
            num_workers,
            thread::available_parallelism()
        );

        let (result_tx, result_rx) = channel::<WorkerMessage>();
        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task>>();
            let result_tx: Sender<WorkerMessage> = result_tx.clone();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let message = match panic::catch_unwind(AssertUnwindSafe(move || task.process())) {
                        Ok(outcome) => WorkerMessage::Finished {
                            channel: index,
                            outcome,
                        },
                        Err(payload) => WorkerMessage::Panicked {
                            channel: index,
                            message: panic_message(payload.as_ref()),
                        },
                    };
                    if result_tx.send(message).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("generation-worker-{index}"))
                .spawn(task_closure)
                .expect("failed to spawn generation worker thread");

            channels.push(TaskChannel {
                task_sender: task_tx,
                num_tasks_in_flight: 0,
                worker: Some(worker),
            });
        }

        TaskManager {
            channels,
            result_receiver: result_rx,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Attempts to send a task to a specific worker channel, returning the
    /// task if the worker has disconnected.
    fn try_send_task(&mut self, task: Box<dyn Task>, channel_idx: usize) -> Result<(), Box<dyn Task>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => Err(err.0),
        }
    }

    /// Finds a worker that can accept another task, round-robin from the last
    /// used one.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|step| (self.current_channel + step) % len)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Hands a task to a free worker, or queues it if all are busy.
    fn publish_task(&mut self, task: Box<dyn Task>) {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_back(task),
            },
            None => self.queued_tasks.push_back(task),
        }
    }

    /// Dispatches queued tasks, oldest first, while workers are free.
    fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Runs every task on the pool and blocks until all of them have finished.
    ///
    /// # Panics
    /// Re-raises a panic from any task in the batch, and panics if every
    /// worker has disconnected while tasks are outstanding.
    pub fn run_batch(&mut self, tasks: Vec<Box<dyn Task>>) -> BatchReport {
        let total = tasks.len();
        let mut report = BatchReport::default();

        for task in tasks {
            self.publish_task(task);
        }

        while report.total() < total {
            match self.result_receiver.recv() {
                Ok(WorkerMessage::Finished { channel, outcome }) => {
                    self.channels[channel].num_tasks_in_flight -= 1;
                    report.record(outcome);
                    self.process_queued_tasks();
                }
                Ok(WorkerMessage::Panicked { channel, message }) => {
                    panic!("generation worker {channel} panicked: {message}");
                }
                Err(_) => {
                    panic!(
                        "all generation workers disconnected with {} tasks outstanding",
                        total - report.total()
                    );
                }
            }
        }

        report
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.queued_tasks.clear();
        let workers: Vec<JoinHandle<()>> = self
            .channels
            .drain(..)
            .filter_map(|channel| channel.worker)
            .collect();
        // Every task sender is gone now, so each worker's recv loop ends.
        for worker in workers {
            let _ = worker.join();
        }
        debug!("task manager workers joined");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingTask {
        running: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        done: Arc<AtomicUsize>,
    }

    impl Task for CountingTask {
        fn process(self: Box<Self>) -> TaskOutcome {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            self.running.fetch_sub(1, Ordering::SeqCst);
            self.done.fetch_add(1, Ordering::SeqCst);
            TaskOutcome::Completed
        }
    }

    struct FixedTask(TaskOutcome);

    impl Task for FixedTask {
        fn process(self: Box<Self>) -> TaskOutcome {
            self.0
        }
    }

    struct PanickingTask;

    impl Task for PanickingTask {
        fn process(self: Box<Self>) -> TaskOutcome {
            panic!("invariant broken");
        }
    }

    #[test]
    fn batch_blocks_until_every_task_finished_and_bounds_concurrency() {
        let mut manager = TaskManager::new(3);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<Box<dyn Task>> = (0..10)
            .map(|_| {
                Box::new(CountingTask {
                    running: running.clone(),
                    peak: peak.clone(),
                    done: done.clone(),
                }) as Box<dyn Task>
            })
            .collect();

        let report = manager.run_batch(tasks);

        assert_eq!(report.completed, 10);
        assert_eq!(done.load(Ordering::SeqCst), 10);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn outcomes_are_tallied() {
        let mut manager = TaskManager::new(2);
        let report = manager.run_batch(vec![
            Box::new(FixedTask(TaskOutcome::Completed)),
            Box::new(FixedTask(TaskOutcome::Skipped)),
            Box::new(FixedTask(TaskOutcome::Cancelled)),
            Box::new(FixedTask(TaskOutcome::Cancelled)),
        ]);

        assert_eq!(
            report,
            BatchReport {
                completed: 1,
                skipped: 1,
                cancelled: 2
            }
        );
        assert_eq!(manager.run_batch(Vec::new()), BatchReport::default());
    }

    #[test]
    #[should_panic(expected = "invariant broken")]
    fn worker_panics_are_raised_on_the_caller() {
        let mut manager = TaskManager::new(1);
        manager.run_batch(vec![Box::new(PanickingTask)]);
    }
}
