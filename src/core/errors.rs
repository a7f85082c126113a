/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 *
 * None of these errors ever reach the caller of a monitored RPC. Capture errors
 * degrade to placeholders, delivery errors are counted per batch, directory
 * errors are logged per branch.
 */

use miette::Diagnostic;
use thiserror::Error;

/// Configuration resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    #[diagnostic(
        code(config::invalid_value),
        help("Check the process property, environment variable or properties file entry.")
    )]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{key} must be greater than zero")]
    #[diagnostic(code(config::zero_value))]
    Zero { key: String },

    #[error("Failed to read properties file {path}: {reason}")]
    #[diagnostic(
        code(config::file_unreadable),
        help("The file is optional; remove MONITOR_CONFIG_FILE to fall back to defaults.")
    )]
    FileUnreadable { path: String, reason: String },
}

/// Outbound HTTP failures
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    #[diagnostic(code(transport::client_build))]
    ClientBuild(String),

    #[error("Invalid header value for {0}")]
    #[diagnostic(
        code(transport::invalid_header),
        help("The API token must be visible ASCII.")
    )]
    InvalidHeader(&'static str),

    #[error("Request to {url} timed out")]
    #[diagnostic(code(transport::timeout))]
    Timeout { url: String },

    #[error("Request to {url} failed: {reason}")]
    #[diagnostic(
        code(transport::request_failed),
        help("Network or collector failure. Check that the monitor API is reachable.")
    )]
    Request { url: String, reason: String },
}

/// Failures while reading call data from the RPC runtime
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum CaptureError {
    /// The runtime does not expose this datum at the current interception point
    #[error("{0} not available at this interception point")]
    #[diagnostic(code(capture::not_available))]
    NotAvailable(&'static str),

    #[error("Type mismatch: expected {expected}, found kind {found}")]
    #[diagnostic(code(capture::type_mismatch))]
    TypeMismatch { expected: &'static str, found: u32 },

    #[error("{0}")]
    #[diagnostic(code(capture::runtime))]
    Runtime(String),
}

impl CaptureError {
    /// Short name used in placeholder values
    pub fn kind_name(&self) -> &'static str {
        match self {
            CaptureError::NotAvailable(_) => "NotAvailable",
            CaptureError::TypeMismatch { .. } => "TypeMismatch",
            CaptureError::Runtime(_) => "RuntimeError",
        }
    }
}

/// Naming directory failures
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum DirectoryError {
    #[error("Directory service unreachable: {0}")]
    #[diagnostic(
        code(directory::unreachable),
        help("Check the nameserver host/port and that the naming service is running.")
    )]
    Unreachable(String),

    #[error("Name not found: {0}")]
    #[diagnostic(code(directory::not_found))]
    NotFound(String),

    #[error("Binding {0} is not a naming context")]
    #[diagnostic(code(directory::not_a_context))]
    NotAContext(String),

    #[error("Directory call failed: {0}")]
    #[diagnostic(code(directory::call_failed))]
    CallFailed(String),
}

/// Periodic schedule failures
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ScheduleError {
    #[error("Failed to start schedule thread: {0}")]
    #[diagnostic(code(schedule::spawn_failed))]
    Spawn(String),

    #[error("Schedule has been shut down")]
    #[diagnostic(code(schedule::closed))]
    Closed,
}

/// Worker pool failures
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum PoolError {
    #[error("Failed to spawn worker thread: {0}")]
    #[diagnostic(code(pool::spawn_failed))]
    Spawn(String),

    #[error("Worker pool is shut down")]
    #[diagnostic(code(pool::closed))]
    Closed,
}

/// Unified agent error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    #[error("Directory error: {0}")]
    #[diagnostic(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Schedule error: {0}")]
    #[diagnostic(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Worker pool error: {0}")]
    #[diagnostic(transparent)]
    Pool(#[from] PoolError),
}

pub type AgentResult<T> = Result<T, AgentError>;
