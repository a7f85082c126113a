/*!
 * Event Enrichment
 * Parsing and capture helpers shared by the client and server sides
 */

use super::decode::decode_value;
use super::info::{RequestInfo, WireValue};
use crate::core::limits::PROBED_SERVICE_CONTEXTS;
use crate::core::CaptureError;
use crate::events::{CapturedPayload, ExceptionKind, ServiceContextEntry, Status};
use std::collections::BTreeMap;

/// Prefix of every system exception id
const SYSTEM_EXCEPTION_PREFIX: &str = "IDL:omg.org/CORBA/";

/// Short name from a repository id
///
/// `IDL:FleetManagement/VehicleTracker:1.0` → `VehicleTracker`
pub fn short_type_name(repository_id: &str) -> &str {
    let body = repository_id
        .strip_prefix("IDL:")
        .or_else(|| repository_id.strip_prefix("RMI:"))
        .unwrap_or(repository_id);
    let body = match body.rfind(':') {
        Some(idx) if idx > 0 => &body[..idx],
        _ => body,
    };
    match body.rfind('/') {
        Some(idx) => &body[idx + 1..],
        None => body,
    }
}

/// Classification of a received or sent exception
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionClass {
    pub status: Status,
    pub kind: ExceptionKind,
    /// `CORBA::<SHORT_NAME>`
    pub message: String,
}

/// Classify an exception by its repository id
///
/// Transient/timeout conditions map to `timeout`, everything else to
/// `exception`. Ids outside the runtime's own namespace are user exceptions.
pub fn classify_exception(exception_id: &str) -> ExceptionClass {
    let name = short_type_name(exception_id);
    let status = if name.contains("TRANSIENT") || name.contains("TIMEOUT") {
        Status::Timeout
    } else {
        Status::Exception
    };

    let user_defined = exception_id.contains("USER_EXCEPTION")
        || (exception_id.starts_with("IDL:") && !exception_id.starts_with(SYSTEM_EXCEPTION_PREFIX));
    let kind = if user_defined {
        ExceptionKind::User
    } else {
        ExceptionKind::System
    };

    ExceptionClass {
        status,
        kind,
        message: format!("CORBA::{}", name),
    }
}

/// Record well-known service contexts by id and length
pub fn probe_service_contexts<I: RequestInfo + ?Sized>(
    ri: &I,
) -> Option<BTreeMap<String, ServiceContextEntry>> {
    let contexts: BTreeMap<_, _> = PROBED_SERVICE_CONTEXTS
        .iter()
        .filter_map(|&id| {
            ri.service_context_len(id).map(|len| {
                (
                    format!("ctx_{}", id),
                    ServiceContextEntry {
                        context_id: id,
                        data_length: len,
                    },
                )
            })
        })
        .collect();

    if contexts.is_empty() {
        None
    } else {
        Some(contexts)
    }
}

/// Decode the call arguments into a positional payload
pub fn capture_arguments<I: RequestInfo + ?Sized>(
    ri: &I,
    operation: Option<&str>,
    max_bytes: usize,
) -> CapturedPayload {
    let payload = match ri.arguments() {
        Ok(values) => CapturedPayload::arguments(
            operation.unwrap_or_default(),
            values.iter().map(|v| decode_value(v)).collect(),
        ),
        Err(CaptureError::NotAvailable(_)) => {
            CapturedPayload::note("Arguments not available at this interception point")
        }
        Err(e) => CapturedPayload::note(format!("Could not extract arguments: {}", e)),
    };
    payload.bounded(max_bytes)
}

/// Decode the return value; `None` when there is nothing to report
pub fn capture_result<I: RequestInfo + ?Sized>(
    ri: &I,
    operation: Option<&str>,
    max_bytes: usize,
) -> Option<CapturedPayload> {
    let payload = match ri.result() {
        Ok(Some(value)) => {
            if value.kind().map(|k| k.is_empty()).unwrap_or(false) {
                return None;
            }
            CapturedPayload::result(operation.unwrap_or_default(), decode_value(&value))
        }
        Ok(None) | Err(CaptureError::NotAvailable(_)) => return None,
        Err(e) => CapturedPayload::note(format!("Could not extract result: {}", e)),
    };
    Some(payload.bounded(max_bytes))
}
