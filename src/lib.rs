/*!
 * ORB Monitor Agent Library
 * RPC traffic capture, correlation and delivery, plus naming directory topology scanning
 */

pub mod addressing;
pub mod agent;
pub mod config;
pub mod core;
pub mod correlation;
pub mod delivery;
pub mod events;
pub mod interceptor;
pub mod schedule;
pub mod telemetry;
pub mod topology;

// Re-exports
pub use agent::{detect_local_address, Agent};
pub use config::MonitorConfig;
pub use crate::core::errors::*;
pub use correlation::{RequestKey, TimingCorrelator};
pub use delivery::{DeliveryPipeline, DeliveryStats, EventSink, HttpTransport, Transport};
pub use events::TrafficEvent;
pub use interceptor::{ClientInterceptor, ServerInterceptor};
pub use telemetry::init_tracing;
pub use topology::{NamingEntry, TopologyScanner};
