/*!
 * Core Module
 * Shared error types and agent-wide constants
 */

pub mod errors;
pub mod limits;

// Re-export for convenience
pub use errors::*;
