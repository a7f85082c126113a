/*!
 * Event Delivery
 *
 * Bounded buffering between the interceptors and the collector, periodic
 * batched sends on a worker pool, and drop/sent/failed accounting.
 */

mod pipeline;
mod pool;
mod stats;
mod transport;

pub use pipeline::DeliveryPipeline;
pub use pool::WorkerPool;
pub use stats::DeliveryStats;
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
pub use transport::MockTransport;

use crate::events::TrafficEvent;

/// Destination for captured events
///
/// Called on the monitored call's thread: implementations must not block.
pub trait EventSink: Send + Sync {
    fn submit(&self, event: TrafficEvent);
}
