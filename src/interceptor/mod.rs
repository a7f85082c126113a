/*!
 * Interception Points
 *
 * Turn runtime lifecycle notifications into traffic events on the calling
 * thread. Handlers only touch the correlator, parse strings and enqueue;
 * they never do I/O and never let a failure reach the monitored call.
 */

mod client;
mod decode;
mod enrich;
mod info;
mod server;
mod skip;

pub use client::ClientInterceptor;
pub use decode::decode_value;
pub use enrich::{classify_exception, short_type_name, ExceptionClass};
pub use info::{ClientRequestInfo, RequestInfo, ServerRequestInfo, TypeKind, WireValue};
pub use server::ServerInterceptor;
pub use skip::SkipPolicy;

use crate::config::MonitorConfig;
use crate::core::CaptureError;
use crate::correlation::{RequestKey, TimingCorrelator};
use crate::delivery::EventSink;
use crate::events::InterceptionPoint;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// What to capture besides call metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub request_data: bool,
    pub response_data: bool,
    pub max_payload_bytes: usize,
}

impl CaptureSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            request_data: config.capture_request_data,
            response_data: config.capture_response_data,
            max_payload_bytes: config.max_payload_bytes,
        }
    }
}

/// State shared by the client and server interceptors
#[derive(Clone)]
pub struct InterceptorContext {
    pub correlator: TimingCorrelator,
    pub sink: Arc<dyn EventSink>,
    pub skip: SkipPolicy,
    pub capture: CaptureSettings,
    /// Address of this process, reported as source (client) or target (server)
    pub local_host: String,
}

impl InterceptorContext {
    pub fn new(
        correlator: TimingCorrelator,
        sink: Arc<dyn EventSink>,
        capture: CaptureSettings,
        local_host: impl Into<String>,
    ) -> Self {
        Self {
            correlator,
            sink,
            skip: SkipPolicy::new(),
            capture,
            local_host: local_host.into(),
        }
    }

    #[inline]
    fn mark_start(&self, key: &RequestKey) {
        if let Some(k) = key.correlation_key() {
            self.correlator.record_start(k, Instant::now());
        }
    }

    #[inline]
    fn take_latency(&self, key: &RequestKey) -> Option<f64> {
        key.correlation_key()
            .and_then(|k| self.correlator.take_elapsed_ms(k, Instant::now()))
    }
}

/// Run a handler body, logging and swallowing errors and panics
fn guarded<F>(point: InterceptionPoint, body: F)
where
    F: FnOnce() -> Result<(), CaptureError>,
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(point = point.as_str(), error = %e, "Interceptor error"),
        Err(_) => debug!(point = point.as_str(), "Interceptor panicked"),
    }
}
