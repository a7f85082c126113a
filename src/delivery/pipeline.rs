/*!
 * Delivery Pipeline
 *
 * Lock-free bounded queue in front of a periodic flusher. Submit never
 * blocks: when the queue is full the event is dropped and counted. Each
 * flush drains the queue in batches and hands every batch to the worker
 * pool; one failed batch never affects another.
 */

use super::pool::WorkerPool;
use super::stats::{Counters, DeliveryStats};
use super::transport::Transport;
use super::EventSink;
use crate::config::MonitorConfig;
use crate::core::limits::{DROP_WARN_EVERY, HEALTH_CHECK_TIMEOUT, SHUTDOWN_DRAIN_TIMEOUT};
use crate::core::{PoolError, ScheduleError};
use crate::events::TrafficEvent;
use crate::schedule::{JobHandle, Schedule};
use crossbeam_queue::ArrayQueue;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Body of a multi-event POST
#[derive(Serialize)]
struct BatchBody<'a> {
    events: &'a [TrafficEvent],
}

struct Shared {
    queue: ArrayQueue<TrafficEvent>,
    transport: Arc<dyn Transport>,
    pool: WorkerPool,
    counters: Counters,
    traffic_url: String,
    batch_url: String,
    health_url: String,
    batch_size: usize,
    flush_interval: Duration,
    enabled: bool,
    accepting: AtomicBool,
    flush_job: Mutex<Option<JobHandle>>,
    /// Held for a whole drain so shutdown never overtakes a scheduled flush
    flushing: Mutex<()>,
}

/// Producer side of the delivery path, cheap to clone
#[derive(Clone)]
pub struct DeliveryPipeline {
    shared: Arc<Shared>,
}

impl DeliveryPipeline {
    pub fn new(config: &MonitorConfig, transport: Arc<dyn Transport>) -> Result<Self, PoolError> {
        let pool = WorkerPool::new("monitor-delivery", config.http_pool_size.max(1))?;
        Ok(Self {
            shared: Arc::new(Shared {
                queue: ArrayQueue::new(config.queue_capacity.max(1)),
                transport,
                pool,
                counters: Counters::default(),
                traffic_url: config.traffic_endpoint(),
                batch_url: config.batch_endpoint(),
                health_url: config.health_endpoint(),
                batch_size: config.batch_size.max(1),
                flush_interval: config.flush_interval,
                enabled: config.enabled,
                accepting: AtomicBool::new(true),
                flush_job: Mutex::new(None),
                flushing: Mutex::new(()),
            }),
        })
    }

    /// Register the periodic flush; no-op when monitoring is disabled
    pub fn start(&self, schedule: &Schedule) -> Result<(), ScheduleError> {
        if !self.shared.enabled {
            info!("Monitoring disabled, event delivery not started");
            return Ok(());
        }
        let pipeline = self.clone();
        let interval = self.shared.flush_interval;
        let handle = schedule.every("flush", interval, interval, move || pipeline.flush())?;
        *self.shared.flush_job.lock() = Some(handle);
        info!(interval_ms = interval.as_millis() as u64, "Event delivery started");
        Ok(())
    }

    /// Enqueue without blocking; drops and counts on overflow
    #[inline]
    pub fn submit(&self, event: TrafficEvent) {
        let shared = &self.shared;
        if !shared.enabled || !shared.accepting.load(Ordering::Acquire) {
            return;
        }
        if shared.queue.push(event).is_err() {
            let dropped = shared.counters.add_dropped();
            if dropped % DROP_WARN_EVERY == 0 {
                warn!(dropped, capacity = shared.queue.capacity(), "Event queue full, dropping events");
            }
        }
    }

    /// Drain the queue into batches and dispatch each to the pool
    pub fn flush(&self) {
        let shared = &self.shared;
        let _drain = shared.flushing.lock();
        loop {
            let mut batch = Vec::with_capacity(shared.batch_size);
            while batch.len() < shared.batch_size {
                match shared.queue.pop() {
                    Some(event) => batch.push(event),
                    None => break,
                }
            }
            if batch.is_empty() {
                return;
            }

            let size = batch.len();
            let worker = Arc::clone(shared);
            if let Err(e) = shared.pool.execute(move || worker.send_batch(batch)) {
                shared.counters.add_failed(size);
                warn!(events = size, error = %e, "Could not dispatch batch");
            }
            if size < shared.batch_size {
                return;
            }
        }
    }

    /// GET the collector health endpoint; only a 200 counts as healthy
    pub fn health_check(&self) -> bool {
        match self
            .shared
            .transport
            .get(&self.shared.health_url, HEALTH_CHECK_TIMEOUT)
        {
            Ok(200) => true,
            Ok(status) => {
                debug!(status, "Collector health check returned non-200");
                false
            }
            Err(e) => {
                debug!(error = %e, "Collector health check failed");
                false
            }
        }
    }

    /// Stop accepting, flush what is queued, wait (bounded) for in-flight sends
    pub fn shutdown(&self) {
        let shared = &self.shared;
        if !shared.accepting.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(job) = shared.flush_job.lock().take() {
            job.cancel();
        }
        self.flush();
        shared.pool.shutdown(SHUTDOWN_DRAIN_TIMEOUT);
        info!(stats = %self.stats(), "Event delivery stopped");
    }

    pub fn stats(&self) -> DeliveryStats {
        self.shared.counters.snapshot(self.shared.queue.len())
    }
}

impl EventSink for DeliveryPipeline {
    fn submit(&self, event: TrafficEvent) {
        DeliveryPipeline::submit(self, event)
    }
}

impl Shared {
    /// One POST per batch, no retry
    fn send_batch(&self, batch: Vec<TrafficEvent>) {
        let size = batch.len();
        let (url, body) = if size == 1 {
            (&self.traffic_url, serde_json::to_vec(&batch[0]))
        } else {
            (&self.batch_url, serde_json::to_vec(&BatchBody { events: &batch }))
        };

        let body = match body {
            Ok(body) => body,
            Err(e) => {
                self.counters.add_failed(size);
                warn!(events = size, error = %e, "Failed to encode batch");
                return;
            }
        };

        match self.transport.post_json(url, body) {
            Ok(status) if (200..300).contains(&status) => {
                self.counters.add_sent(size);
                debug!(events = size, status, "Batch delivered");
            }
            Ok(status) => {
                self.counters.add_failed(size);
                warn!(events = size, status, url = %url, "Collector rejected batch");
            }
            Err(e) => {
                self.counters.add_failed(size);
                warn!(events = size, error = %e, "Batch delivery failed");
            }
        }
    }
}
