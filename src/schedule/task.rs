/*!
 * Schedule Task
 * Command-driven job registry on a current-thread tokio runtime
 */

use crate::core::limits::SHUTDOWN_DRAIN_TIMEOUT;
use crate::core::ScheduleError;
use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

type Job = Arc<dyn Fn() + Send + Sync + 'static>;

/// Control messages for the schedule thread
enum ScheduleCommand {
    Register {
        id: u64,
        name: &'static str,
        initial_delay: Duration,
        period: Duration,
        job: Job,
    },
    Cancel(u64),
    Shutdown,
}

/// Handle to the schedule thread
pub struct Schedule {
    command_tx: mpsc::UnboundedSender<ScheduleCommand>,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
    next_id: AtomicU64,
}

/// Cancels one registered job
#[derive(Clone)]
pub struct JobHandle {
    id: u64,
    command_tx: mpsc::UnboundedSender<ScheduleCommand>,
}

impl JobHandle {
    /// Stop future runs; a run already in progress completes
    pub fn cancel(&self) {
        let _ = self.command_tx.send(ScheduleCommand::Cancel(self.id));
    }
}

impl Schedule {
    pub fn start() -> Result<Self, ScheduleError> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .thread_name("monitor-job")
            .build()
            .map_err(|e| ScheduleError::Spawn(e.to_string()))?;

        let thread = thread::Builder::new()
            .name("monitor-schedule".to_string())
            .spawn(move || {
                runtime.block_on(run_schedule_loop(command_rx));
                runtime.shutdown_timeout(SHUTDOWN_DRAIN_TIMEOUT);
            })
            .map_err(|e| ScheduleError::Spawn(e.to_string()))?;

        info!("Schedule thread started");
        Ok(Self {
            command_tx,
            thread: Mutex::new(Some(thread)),
            next_id: AtomicU64::new(1),
        })
    }

    /// Run `job` after `initial_delay`, then every `period`
    ///
    /// A run that overruns its period delays the next one; missed ticks are skipped.
    pub fn every<F>(
        &self,
        name: &'static str,
        initial_delay: Duration,
        period: Duration,
        job: F,
    ) -> Result<JobHandle, ScheduleError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.command_tx
            .send(ScheduleCommand::Register {
                id,
                name,
                initial_delay,
                period,
                job: Arc::new(job),
            })
            .map_err(|_| ScheduleError::Closed)?;

        Ok(JobHandle {
            id,
            command_tx: self.command_tx.clone(),
        })
    }

    /// Stop all jobs and join the schedule thread
    ///
    /// Must not be called from inside a job.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ScheduleCommand::Shutdown);
        if let Some(thread) = self.thread.lock().take() {
            if thread.join().is_err() {
                warn!("Schedule thread panicked");
            } else {
                info!("Schedule shutdown complete");
            }
        }
    }
}

impl Drop for Schedule {
    fn drop(&mut self) {
        if self.thread.lock().is_some() {
            let _ = self.command_tx.send(ScheduleCommand::Shutdown);
        }
    }
}

async fn run_schedule_loop(mut command_rx: mpsc::UnboundedReceiver<ScheduleCommand>) {
    let mut jobs: HashMap<u64, (&'static str, tokio::task::JoinHandle<()>), RandomState> =
        HashMap::with_hasher(RandomState::new());

    while let Some(command) = command_rx.recv().await {
        match command {
            ScheduleCommand::Register {
                id,
                name,
                initial_delay,
                period,
                job,
            } => {
                debug!(job = name, period_ms = period.as_millis() as u64, "Job registered");
                let handle = tokio::spawn(run_job(name, initial_delay, period, job));
                jobs.insert(id, (name, handle));
            }

            ScheduleCommand::Cancel(id) => {
                if let Some((name, handle)) = jobs.remove(&id) {
                    handle.abort();
                    debug!(job = name, "Job cancelled");
                }
            }

            ScheduleCommand::Shutdown => break,
        }
    }

    for (_, (_, handle)) in jobs.drain() {
        handle.abort();
    }
}

async fn run_job(name: &'static str, initial_delay: Duration, period: Duration, job: Job) {
    let mut ticks = interval_at(Instant::now() + initial_delay, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticks.tick().await;
        let body = Arc::clone(&job);
        if tokio::task::spawn_blocking(move || body()).await.is_err() {
            warn!(job = name, "Scheduled job panicked");
        }
    }
}
