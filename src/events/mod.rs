/*!
 * Event Model
 * Strongly-typed traffic records sent to the collector
 */

mod traffic;
mod value;

pub use traffic::{
    CallSite, Direction, ExceptionKind, InterceptionPoint, MessageKind, ServiceContextEntry, Status,
    TrafficEvent,
};
pub use value::{CapturedPayload, CapturedValue, PositionalArgs, TypeDescriptor};
