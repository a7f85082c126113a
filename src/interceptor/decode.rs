/*!
 * Value Decoding
 * One case per type kind, closed set of results, never fails
 */

use super::info::{TypeKind, WireValue};
use crate::core::CaptureError;
use crate::events::{CapturedValue, TypeDescriptor};

/// Decode a runtime value best-effort
///
/// Scalars and strings decode to native values, void/null to `Absent`,
/// anything structured to a descriptor. Failures become a placeholder.
pub fn decode_value<V: WireValue + ?Sized>(value: &V) -> CapturedValue {
    decode_inner(value).unwrap_or_else(|e| CapturedValue::unavailable(e.kind_name()))
}

fn decode_inner<V: WireValue + ?Sized>(value: &V) -> Result<CapturedValue, CaptureError> {
    let kind = value.kind()?;
    let decoded = match kind {
        TypeKind::Boolean => CapturedValue::Bool(value.read_bool()?),
        TypeKind::Char | TypeKind::WChar => CapturedValue::Text(value.read_char()?.to_string()),
        TypeKind::Short | TypeKind::Long | TypeKind::LongLong => {
            CapturedValue::Signed(value.read_signed()?)
        }
        TypeKind::Octet | TypeKind::UShort | TypeKind::ULong | TypeKind::ULongLong => {
            CapturedValue::Unsigned(value.read_unsigned()?)
        }
        TypeKind::Float | TypeKind::Double => CapturedValue::Float(value.read_float()?),
        TypeKind::String | TypeKind::WString => CapturedValue::Text(value.read_string()?),
        TypeKind::Enum => CapturedValue::Text(value.read_enum_member()?),
        TypeKind::Void | TypeKind::Null => CapturedValue::Absent,
        other => CapturedValue::Descriptor(TypeDescriptor {
            type_name: value.type_name()?,
            kind: other.value(),
            id: value.type_id()?,
        }),
    };
    Ok(decoded)
}
