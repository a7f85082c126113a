/*!
 * Server Interceptor
 * Observes incoming calls on the servant side
 */

use super::enrich::{
    capture_arguments, capture_result, classify_exception, probe_service_contexts, short_type_name,
};
use super::info::ServerRequestInfo;
use super::{guarded, InterceptorContext};
use crate::core::limits::PROTOCOL_VERSION;
use crate::core::CaptureError;
use crate::correlation::RequestKey;
use crate::events::{CallSite, Direction, InterceptionPoint, MessageKind, Status, TrafficEvent};
use std::sync::Arc;
use tracing::trace;

/// Servant-side interceptor
#[derive(Clone)]
pub struct ServerInterceptor {
    ctx: Arc<InterceptorContext>,
}

struct Observed {
    operation: String,
    repository_id: Option<String>,
    key: RequestKey,
}

impl ServerInterceptor {
    pub const NAME: &'static str = "MonitorServerInterceptor";

    pub fn new(ctx: Arc<InterceptorContext>) -> Self {
        Self { ctx }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Earliest server point: only the start time is recorded
    pub fn receive_request_service_contexts<R: ServerRequestInfo + ?Sized>(&self, ri: &R) {
        guarded(InterceptionPoint::ReceiveRequest, || {
            if let Some(seen) = self.observe(ri)? {
                self.ctx.mark_start(&seen.key);
            }
            Ok(())
        })
    }

    /// Request dispatched to the servant
    pub fn receive_request<R: ServerRequestInfo + ?Sized>(&self, ri: &R) {
        guarded(InterceptionPoint::ReceiveRequest, || {
            let Some(seen) = self.observe(ri)? else {
                return Ok(());
            };
            let call = self.call_site(ri, &seen, InterceptionPoint::ReceiveRequest);
            let mut event = TrafficEvent::new(call, Direction::Request, Status::Success, MessageKind::Request);
            if self.ctx.capture.request_data {
                event.request_data = Some(capture_arguments(
                    ri,
                    Some(&seen.operation),
                    self.ctx.capture.max_payload_bytes,
                ));
            }
            self.ctx.sink.submit(event);
            Ok(())
        })
    }

    /// Servant returned normally
    pub fn send_reply<R: ServerRequestInfo + ?Sized>(&self, ri: &R) {
        guarded(InterceptionPoint::SendReply, || {
            let Some(seen) = self.observe(ri)? else {
                return Ok(());
            };
            let latency = self.ctx.take_latency(&seen.key);

            let call = self.call_site(ri, &seen, InterceptionPoint::SendReply);
            let mut event = TrafficEvent::new(call, Direction::Reply, Status::Success, MessageKind::Reply);
            event.latency_ms = latency;
            if self.ctx.capture.response_data {
                event.response_data =
                    capture_result(ri, Some(&seen.operation), self.ctx.capture.max_payload_bytes);
            }
            self.ctx.sink.submit(event);
            Ok(())
        })
    }

    /// Servant raised
    pub fn send_exception<R: ServerRequestInfo + ?Sized>(&self, ri: &R) {
        guarded(InterceptionPoint::SendException, || {
            let Some(seen) = self.observe(ri)? else {
                return Ok(());
            };
            let latency = self.ctx.take_latency(&seen.key);
            let exception_id = ri
                .sending_exception_id()
                .unwrap_or_else(|_| "UNKNOWN".to_string());
            let class = classify_exception(&exception_id);

            let call = self.call_site(ri, &seen, InterceptionPoint::SendException);
            let mut event = TrafficEvent::new(call, Direction::Reply, class.status, MessageKind::Reply);
            event.error_message = Some(class.message);
            event.exception_type = Some(class.kind);
            event.latency_ms = latency;
            self.ctx.sink.submit(event);
            Ok(())
        })
    }

    /// Location forward issued by the servant side
    pub fn send_other<R: ServerRequestInfo + ?Sized>(&self, ri: &R) {
        guarded(InterceptionPoint::SendOther, || {
            let Some(seen) = self.observe(ri)? else {
                return Ok(());
            };
            let latency = self.ctx.take_latency(&seen.key);
            let call = self.call_site(ri, &seen, InterceptionPoint::SendOther);
            let mut event = TrafficEvent::new(
                call,
                Direction::Reply,
                Status::Success,
                MessageKind::LocateReply,
            );
            event.latency_ms = latency;
            self.ctx.sink.submit(event);
            Ok(())
        })
    }

    fn observe<R: ServerRequestInfo + ?Sized>(&self, ri: &R) -> Result<Option<Observed>, CaptureError> {
        let operation = ri.operation()?;
        if self.ctx.skip.skips_operation(&operation) {
            trace!(operation = %operation, "Skipping infrastructure operation");
            return Ok(None);
        }
        let repository_id = ri.target_most_derived_interface().ok();
        if let Some(id) = repository_id.as_deref() {
            if self.ctx.skip.skips_type_ids(&[id]) {
                trace!(operation = %operation, "Skipping infrastructure interface");
                return Ok(None);
            }
        }
        Ok(Some(Observed {
            operation,
            repository_id,
            key: RequestKey::from_raw(&ri.request_id()),
        }))
    }

    fn call_site<R: ServerRequestInfo + ?Sized>(
        &self,
        ri: &R,
        seen: &Observed,
        point: InterceptionPoint,
    ) -> CallSite {
        let interface_name = seen
            .repository_id
            .as_deref()
            .map(|id| short_type_name(id).to_string());

        CallSite {
            request_id: seen.key.to_string(),
            operation: Some(seen.operation.clone()),
            interface_name,
            repository_id: seen.repository_id.clone(),
            source_host: None,
            source_port: None,
            target_host: Some(self.ctx.local_host.clone()),
            target_port: None,
            source_service_name: None,
            target_service_name: object_name(ri),
            giop_version: PROTOCOL_VERSION,
            interception_point: point,
            context_data: probe_service_contexts(ri),
        }
    }
}

/// Printable object id, used as the target's service name
fn object_name<R: ServerRequestInfo + ?Sized>(ri: &R) -> Option<String> {
    let id = ri.object_id().ok()?;
    let name = String::from_utf8_lossy(&id).trim().to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
