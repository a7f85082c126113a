/*!
 * Traffic Events
 * One record per observed lifecycle point, serialized for the collector
 */

use super::value::CapturedPayload;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// Request or reply leg of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Request,
    Reply,
}

/// Outcome of the observed leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Exception,
    Timeout,
}

/// Protocol message kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKind {
    Request,
    Reply,
    LocateReply,
}

/// System exceptions come from the runtime, user exceptions from the interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExceptionKind {
    #[serde(rename = "SYSTEM_EXCEPTION")]
    System,
    #[serde(rename = "USER_EXCEPTION")]
    User,
}

/// Lifecycle callback that produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterceptionPoint {
    SendRequest,
    ReceiveReply,
    ReceiveException,
    ReceiveOther,
    ReceiveRequest,
    SendReply,
    SendException,
    SendOther,
}

impl InterceptionPoint {
    pub fn as_str(self) -> &'static str {
        match self {
            InterceptionPoint::SendRequest => "send_request",
            InterceptionPoint::ReceiveReply => "receive_reply",
            InterceptionPoint::ReceiveException => "receive_exception",
            InterceptionPoint::ReceiveOther => "receive_other",
            InterceptionPoint::ReceiveRequest => "receive_request",
            InterceptionPoint::SendReply => "send_reply",
            InterceptionPoint::SendException => "send_exception",
            InterceptionPoint::SendOther => "send_other",
        }
    }
}

/// Service context recorded by id and size only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceContextEntry {
    pub context_id: u32,
    pub data_length: usize,
}

/// Facts about a call shared by every event built from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSite {
    pub request_id: String,
    pub operation: Option<String>,
    pub interface_name: Option<String>,
    pub repository_id: Option<String>,
    pub source_host: Option<String>,
    pub source_port: Option<u16>,
    pub target_host: Option<String>,
    pub target_port: Option<u16>,
    pub source_service_name: Option<String>,
    pub target_service_name: Option<String>,
    pub giop_version: &'static str,
    #[serde(rename = "interceptor_point")]
    pub interception_point: InterceptionPoint,
    pub context_data: Option<BTreeMap<String, ServiceContextEntry>>,
}

/// One captured lifecycle point
///
/// Built once, with every field known, and never mutated afterwards.
/// `latency_ms` is present only when a matching start was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficEvent {
    #[serde(flatten)]
    pub call: CallSite,
    pub direction: Direction,
    pub status: Status,
    pub message_type: MessageKind,
    pub request_data: Option<CapturedPayload>,
    pub response_data: Option<CapturedPayload>,
    pub error_message: Option<String>,
    pub exception_type: Option<ExceptionKind>,
    pub latency_ms: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl TrafficEvent {
    /// Event stamped now, without payloads, error or latency
    pub fn new(call: CallSite, direction: Direction, status: Status, message_type: MessageKind) -> Self {
        Self {
            call,
            direction,
            status,
            message_type,
            request_data: None,
            response_data: None,
            error_message: None,
            exception_type: None,
            latency_ms: None,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

impl fmt::Display for TrafficEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TrafficEvent{{op={}, iface={}, dir={:?}, status={:?}, latency={:.1}ms}}",
            self.call.operation.as_deref().unwrap_or("?"),
            self.call.interface_name.as_deref().unwrap_or("?"),
            self.direction,
            self.status,
            self.latency_ms.unwrap_or(0.0)
        )
    }
}
