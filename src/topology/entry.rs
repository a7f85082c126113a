/*!
 * Naming Entries
 * Flattened directory records, rebuilt on every scan
 */

use crate::core::limits::REPORT_SOURCE;
use serde::Serialize;
use time::OffsetDateTime;

/// Entry type as reported to the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Context,
    Object,
}

/// One discovered binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingEntry {
    /// Slash-joined `name[.kind]` chain from the root
    pub path: String,
    pub name: String,
    pub kind: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ior: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_alive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ior_length: Option<usize>,
}

impl NamingEntry {
    fn bare(path: String, name: &str, kind: &str, entry_type: EntryType) -> Self {
        Self {
            path,
            name: name.to_string(),
            kind: kind.to_string(),
            entry_type,
            ior: None,
            is_alive: None,
            error: None,
            host: None,
            port: None,
            ior_length: None,
        }
    }

    pub fn context(path: String, name: &str, kind: &str) -> Self {
        Self::bare(path, name, kind, EntryType::Context)
    }

    pub fn object(path: String, name: &str, kind: &str) -> Self {
        Self::bare(path, name, kind, EntryType::Object)
    }

    /// Mark unreachable with the reason
    pub fn failed(&mut self, error: impl ToString) {
        self.is_alive = Some(false);
        self.error = Some(error.to_string());
    }
}

/// Body of `POST {base}/nameserver/report`
#[derive(Debug, Serialize)]
pub struct NamingReport<'a> {
    pub source: &'static str,
    pub entries: &'a [NamingEntry],
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl<'a> NamingReport<'a> {
    pub fn new(entries: &'a [NamingEntry]) -> Self {
        Self {
            source: REPORT_SOURCE,
            entries,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}
