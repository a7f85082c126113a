/*!
 * Worker Pool
 * Fixed set of named threads draining a shared task channel
 */

use crate::core::PoolError;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Bounded-parallelism executor for blocking sends
pub struct WorkerPool {
    tasks: Mutex<Option<flume::Sender<Task>>>,
    exited: flume::Receiver<()>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(name: &str, workers: usize) -> Result<Self, PoolError> {
        let (task_tx, task_rx) = flume::unbounded::<Task>();
        let (exit_tx, exit_rx) = flume::bounded(workers.max(1));

        for index in 0..workers {
            let tasks = task_rx.clone();
            let exited = exit_tx.clone();
            thread::Builder::new()
                .name(format!("{}-{}", name, index))
                .spawn(move || {
                    while let Ok(task) = tasks.recv() {
                        if catch_unwind(AssertUnwindSafe(task)).is_err() {
                            warn!("Delivery task panicked");
                        }
                    }
                    let _ = exited.send(());
                })
                .map_err(|e| PoolError::Spawn(e.to_string()))?;
        }

        debug!(workers, "Worker pool started");
        Ok(Self {
            tasks: Mutex::new(Some(task_tx)),
            exited: exit_rx,
            workers,
        })
    }

    pub fn execute<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = self.tasks.lock();
        let sender = guard.as_ref().ok_or(PoolError::Closed)?;
        sender.send(Box::new(task)).map_err(|_| PoolError::Closed)
    }

    /// Stop accepting tasks and wait for queued ones to finish
    ///
    /// Returns false if workers were still busy when `timeout` elapsed;
    /// those threads are left to finish on their own.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        let Some(sender) = self.tasks.lock().take() else {
            return true;
        };
        drop(sender);

        let deadline = Instant::now() + timeout;
        for _ in 0..self.workers {
            if self.exited.recv_deadline(deadline).is_err() {
                warn!(timeout_ms = timeout.as_millis() as u64, "Workers did not finish before shutdown timeout");
                return false;
            }
        }
        true
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets idle workers exit
        self.tasks.lock().take();
    }
}
