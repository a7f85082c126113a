/*!
 * Captured Values
 * Closed set of decoded argument/result values and the payload wrapper
 */

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Summary of a structured value: its type, not its contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    #[serde(rename = "_type")]
    pub type_name: String,
    #[serde(rename = "_kind")]
    pub kind: u32,
    #[serde(rename = "_id")]
    pub id: String,
}

/// A best-effort decoded argument or result
///
/// Serialized without tags: scalars and strings as JSON primitives,
/// descriptors as objects, `Absent` as null, `Unavailable` as a
/// `<Reason>` placeholder string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CapturedValue {
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    /// Characters, narrow/wide strings and enum member names
    Text(String),
    Descriptor(TypeDescriptor),
    Absent,
    Unavailable(String),
}

impl CapturedValue {
    pub fn unavailable(reason: &str) -> Self {
        CapturedValue::Unavailable(format!("<{}>", reason))
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, CapturedValue::Absent)
    }
}

/// Request or response data attached to an event
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CapturedPayload {
    #[serde(rename = "_idl_type", skip_serializing_if = "Option::is_none")]
    pub idl_type: Option<String>,
    /// Positional arguments, serialized as `"params": {"arg0": .., "arg1": ..}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<PositionalArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<CapturedValue>,
    #[serde(rename = "_note", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CapturedPayload {
    pub fn arguments(operation: &str, params: Vec<CapturedValue>) -> Self {
        Self {
            idl_type: Some(operation.to_string()),
            params: Some(PositionalArgs(params)),
            ..Self::default()
        }
    }

    pub fn result(operation: &str, value: CapturedValue) -> Self {
        Self {
            idl_type: Some(format!("{}::_return", operation)),
            return_value: Some(value),
            ..Self::default()
        }
    }

    pub fn note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }

    /// Replace with a note when the encoded payload exceeds `max_bytes`
    pub fn bounded(self, max_bytes: usize) -> Self {
        match serde_json::to_vec(&self) {
            Ok(bytes) if bytes.len() > max_bytes => Self::note(format!(
                "Payload of {} bytes exceeds limit of {} bytes",
                bytes.len(),
                max_bytes
            )),
            Ok(_) => self,
            Err(e) => Self::note(format!("Could not encode payload: {}", e)),
        }
    }
}

/// Ordered call arguments keyed by position
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalArgs(pub Vec<CapturedValue>);

impl Serialize for PositionalArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, value) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("arg{}", i), value)?;
        }
        map.end()
    }
}
