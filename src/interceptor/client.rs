/*!
 * Client Interceptor
 * Observes outgoing calls: request sent, then reply, exception or redirect
 */

use super::enrich::{
    capture_arguments, capture_result, classify_exception, probe_service_contexts, short_type_name,
};
use super::info::ClientRequestInfo;
use super::{guarded, InterceptorContext};
use crate::addressing::parse_endpoint;
use crate::core::limits::PROTOCOL_VERSION;
use crate::core::CaptureError;
use crate::correlation::RequestKey;
use crate::events::{CallSite, Direction, InterceptionPoint, MessageKind, Status, TrafficEvent};
use std::sync::Arc;
use tracing::trace;

/// Caller-side interceptor
#[derive(Clone)]
pub struct ClientInterceptor {
    ctx: Arc<InterceptorContext>,
}

/// Facts read once per handler invocation
struct Observed {
    operation: String,
    type_ids: Vec<String>,
    key: RequestKey,
}

impl ClientInterceptor {
    pub const NAME: &'static str = "MonitorClientInterceptor";

    pub fn new(ctx: Arc<InterceptorContext>) -> Self {
        Self { ctx }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Request leaves this process: record start, emit request event
    pub fn send_request<R: ClientRequestInfo + ?Sized>(&self, ri: &R) {
        guarded(InterceptionPoint::SendRequest, || {
            let Some(seen) = self.observe(ri)? else {
                return Ok(());
            };
            self.ctx.mark_start(&seen.key);

            let call = self.call_site(ri, &seen, InterceptionPoint::SendRequest);
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

    /// Normal reply arrived
    pub fn receive_reply<R: ClientRequestInfo + ?Sized>(&self, ri: &R) {
        guarded(InterceptionPoint::ReceiveReply, || {
            let Some(seen) = self.observe(ri)? else {
                return Ok(());
            };
            let latency = self.ctx.take_latency(&seen.key);

            let call = self.call_site(ri, &seen, InterceptionPoint::ReceiveReply);
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

    /// Exception arrived instead of a reply
    pub fn receive_exception<R: ClientRequestInfo + ?Sized>(&self, ri: &R) {
        guarded(InterceptionPoint::ReceiveException, || {
            let Some(seen) = self.observe(ri)? else {
                return Ok(());
            };
            let latency = self.ctx.take_latency(&seen.key);
            let exception_id = ri
                .received_exception_id()
                .unwrap_or_else(|_| "UNKNOWN".to_string());
            let class = classify_exception(&exception_id);

            let call = self.call_site(ri, &seen, InterceptionPoint::ReceiveException);
            let mut event = TrafficEvent::new(call, Direction::Reply, class.status, MessageKind::Reply);
            event.error_message = Some(class.message);
            event.exception_type = Some(class.kind);
            event.latency_ms = latency;
            self.ctx.sink.submit(event);
            Ok(())
        })
    }

    /// Location forward or other non-reply outcome
    pub fn receive_other<R: ClientRequestInfo + ?Sized>(&self, ri: &R) {
        guarded(InterceptionPoint::ReceiveOther, || {
            let Some(seen) = self.observe(ri)? else {
                return Ok(());
            };
            let call = self.call_site(ri, &seen, InterceptionPoint::ReceiveOther);
            self.ctx.sink.submit(TrafficEvent::new(
                call,
                Direction::Reply,
                Status::Success,
                MessageKind::LocateReply,
            ));
            Ok(())
        })
    }

    /// Read the facts needed for the skip decision; `None` means skip
    fn observe<R: ClientRequestInfo + ?Sized>(&self, ri: &R) -> Result<Option<Observed>, CaptureError> {
        let operation = ri.operation()?;
        if self.ctx.skip.skips_operation(&operation) {
            trace!(operation = %operation, "Skipping infrastructure operation");
            return Ok(None);
        }
        let type_ids = ri.target_type_ids().unwrap_or_default();
        if self.ctx.skip.skips_type_ids(&type_ids) {
            trace!(operation = %operation, "Skipping infrastructure interface");
            return Ok(None);
        }
        Ok(Some(Observed {
            operation,
            type_ids,
            key: RequestKey::from_raw(&ri.request_id()),
        }))
    }

    fn call_site<R: ClientRequestInfo + ?Sized>(
        &self,
        ri: &R,
        seen: &Observed,
        point: InterceptionPoint,
    ) -> CallSite {
        let repository_id = seen.type_ids.first().cloned();
        let interface_name = repository_id
            .as_deref()
            .map(|id| short_type_name(id).to_string());
        let target = ri
            .effective_target()
            .ok()
            .and_then(|reference| parse_endpoint(&reference));

        CallSite {
            request_id: seen.key.to_string(),
            operation: Some(seen.operation.clone()),
            interface_name,
            repository_id,
            source_host: Some(self.ctx.local_host.clone()),
            source_port: None,
            target_host: target.as_ref().map(|t| t.host.clone()),
            target_port: target.and_then(|t| t.port),
            source_service_name: None,
            target_service_name: None,
            giop_version: PROTOCOL_VERSION,
            interception_point: point,
            context_data: probe_service_contexts(ri),
        }
    }
}
