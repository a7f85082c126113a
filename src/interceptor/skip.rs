/*!
 * Skip Policy
 *
 * Calls made by the runtime's own bootstrap and by the naming service are
 * never monitored; observing them loops back into the agent.
 */

use crate::core::limits::{SKIP_INTERFACE_FRAGMENTS, SKIP_OPERATIONS};
use ahash::RandomState;
use std::collections::HashSet;

/// Decides whether a call is infrastructure traffic
#[derive(Debug, Clone)]
pub struct SkipPolicy {
    operations: HashSet<&'static str, RandomState>,
    interface_fragments: &'static [&'static str],
}

impl SkipPolicy {
    pub fn new() -> Self {
        let mut operations = HashSet::with_hasher(RandomState::new());
        operations.extend(SKIP_OPERATIONS.iter().copied());
        Self {
            operations,
            interface_fragments: SKIP_INTERFACE_FRAGMENTS,
        }
    }

    #[inline]
    pub fn skips_operation(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }

    /// True when any type id contains an infrastructure fragment
    pub fn skips_type_ids<S: AsRef<str>>(&self, type_ids: &[S]) -> bool {
        type_ids.iter().any(|id| {
            let id = id.as_ref();
            self.interface_fragments
                .iter()
                .any(|fragment| id.contains(fragment))
        })
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::new()
    }
}
