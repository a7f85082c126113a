/*!
 * Agent Limits and Constants
 *
 * Centralized location for the agent's fixed sizes, intervals and identifiers.
 * Values that the collector or the RPC runtime depend on are marked [WIRE].
 * Values on the monitored call path are marked [HOT].
 */

use std::time::Duration;

// =============================================================================
// DELIVERY
// =============================================================================

/// Default bounded queue capacity between interceptors and the flusher
/// [HOT] Submit never blocks; overflow is dropped and counted
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Emit a drop warning once per this many dropped events
pub const DROP_WARN_EVERY: u64 = 100;

/// Health check connect/read timeout
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Upper bound on waiting for in-flight sends during shutdown
pub const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// CORRELATION
// =============================================================================

/// Bytes of the raw request id used for the correlation key
/// [WIRE] Matches the key the collector uses to pair request/reply events
pub const REQUEST_KEY_BYTES: usize = 16;

/// How often unmatched correlation entries are swept
pub const CORRELATION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// =============================================================================
// INTERCEPTION
// =============================================================================

/// Protocol version tag attached to every event
/// [WIRE]
pub const PROTOCOL_VERSION: &str = "1.2";

/// Service contexts probed on every call (code sets, bidirectional,
/// sending context runtime, 15, vendor)
/// [HOT] Only id and length are recorded
pub const PROBED_SERVICE_CONTEXTS: [u32; 5] = [0, 1, 6, 15, 0x4F54_5300];

/// Operations that belong to the runtime or the naming service itself
pub const SKIP_OPERATIONS: &[&str] = &[
    // Built-in object operations (narrow, _is_a, ...)
    "_is_a",
    "_non_existent",
    "_get_interface_def",
    "_get_component",
    "_get_domain_managers",
    "_get_policy",
    "_repository_id",
    // Naming service operations
    "resolve",
    "resolve_str",
    "bind",
    "rebind",
    "unbind",
    "bind_context",
    "rebind_context",
    "bind_new_context",
    "list",
    "to_name",
    "to_string",
    "destroy",
    "new_context",
    "to_url",
    // Runtime bootstrap
    "resolve_initial_references",
];

/// Type id fragments of infrastructure interfaces
pub const SKIP_INTERFACE_FRAGMENTS: &[&str] = &[
    "CosNaming",
    "NamingContext",
    "PortableServer",
    "IORTable",
    "CORBA/Repository",
    "InitialReferences",
];

// =============================================================================
// TOPOLOGY
// =============================================================================

/// Bindings requested per listing call
pub const LIST_PAGE_SIZE: u32 = 1000;

/// Contexts deeper than this are reported but not descended
pub const MAX_WALK_DEPTH: usize = 32;

/// Value of the `source` field in topology reports
/// [WIRE]
pub const REPORT_SOURCE: &str = "agent";
