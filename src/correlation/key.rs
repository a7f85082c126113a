/*!
 * Request Keys
 * Canonical display/correlation form of a raw request id
 */

use crate::core::limits::REQUEST_KEY_BYTES;
use std::fmt;
use uuid::Uuid;

/// Identifier attached to an event as `request_id`
///
/// A non-empty raw id yields a correlatable key: the hex encoding of its first
/// 16 bytes. An empty raw id yields a random display-only key that never
/// touches the correlator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Correlated(String),
    Anonymous(String),
}

impl RequestKey {
    pub fn from_raw(raw: &[u8]) -> Self {
        if raw.is_empty() {
            return RequestKey::Anonymous(Uuid::new_v4().to_string());
        }
        let take = raw.len().min(REQUEST_KEY_BYTES);
        RequestKey::Correlated(hex::encode(&raw[..take]))
    }

    /// Key to use with the correlator, if any
    #[inline]
    pub fn correlation_key(&self) -> Option<&str> {
        match self {
            RequestKey::Correlated(key) => Some(key),
            RequestKey::Anonymous(_) => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            RequestKey::Correlated(key) | RequestKey::Anonymous(key) => key,
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
