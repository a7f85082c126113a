/*!
 * Runtime Call Information
 *
 * What the RPC runtime exposes at each interception point. The runtime
 * adapter implements these traits; the interceptors only read through them.
 * Any accessor may report `CaptureError::NotAvailable` at points where the
 * runtime does not carry that datum.
 */

use crate::core::CaptureError;

/// Type-code kinds with their wire numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TypeKind {
    Null = 0,
    Void = 1,
    Short = 2,
    Long = 3,
    UShort = 4,
    ULong = 5,
    Float = 6,
    Double = 7,
    Boolean = 8,
    Char = 9,
    Octet = 10,
    Any = 11,
    TypeCode = 12,
    Principal = 13,
    ObjRef = 14,
    Struct = 15,
    Union = 16,
    Enum = 17,
    String = 18,
    Sequence = 19,
    Array = 20,
    Alias = 21,
    Except = 22,
    LongLong = 23,
    ULongLong = 24,
    LongDouble = 25,
    WChar = 26,
    WString = 27,
    Fixed = 28,
    Value = 29,
    ValueBox = 30,
    Native = 31,
    AbstractInterface = 32,
    LocalInterface = 33,
}

impl TypeKind {
    #[inline]
    pub fn value(self) -> u32 {
        self as u32
    }

    /// Kinds that carry no value
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, TypeKind::Void | TypeKind::Null)
    }
}

/// A self-describing runtime value (argument, result, exception body)
pub trait WireValue {
    fn kind(&self) -> Result<TypeKind, CaptureError>;
    fn type_name(&self) -> Result<String, CaptureError>;
    fn type_id(&self) -> Result<String, CaptureError>;

    fn read_bool(&self) -> Result<bool, CaptureError>;
    /// Narrow and wide characters
    fn read_char(&self) -> Result<char, CaptureError>;
    /// short, long, long long
    fn read_signed(&self) -> Result<i64, CaptureError>;
    /// octet, unsigned short/long/long long
    fn read_unsigned(&self) -> Result<u64, CaptureError>;
    /// float and double
    fn read_float(&self) -> Result<f64, CaptureError>;
    /// Narrow and wide strings
    fn read_string(&self) -> Result<String, CaptureError>;
    /// Member name of an enum value
    fn read_enum_member(&self) -> Result<String, CaptureError>;
}

/// Facts available on both sides of a call
pub trait RequestInfo {
    type Value: WireValue;

    /// Raw request id representation; may be empty
    fn request_id(&self) -> Vec<u8>;
    fn operation(&self) -> Result<String, CaptureError>;
    /// Length of a service context's data, `None` when not present
    fn service_context_len(&self, context_id: u32) -> Option<usize>;
    fn arguments(&self) -> Result<Vec<Self::Value>, CaptureError>;
    /// Return value; `Ok(None)` for operations without one
    fn result(&self) -> Result<Option<Self::Value>, CaptureError>;
}

/// Caller-side view of a call
pub trait ClientRequestInfo: RequestInfo {
    /// Repository ids declared by the target reference, most derived first
    fn target_type_ids(&self) -> Result<Vec<String>, CaptureError>;
    /// String form of the reference the request is actually sent to
    fn effective_target(&self) -> Result<String, CaptureError>;
    fn received_exception_id(&self) -> Result<String, CaptureError>;
}

/// Servant-side view of a call
pub trait ServerRequestInfo: RequestInfo {
    fn object_id(&self) -> Result<Vec<u8>, CaptureError>;
    fn target_most_derived_interface(&self) -> Result<String, CaptureError>;
    fn sending_exception_id(&self) -> Result<String, CaptureError>;
}
