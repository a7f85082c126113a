/*!
 * Timing Correlator
 * Concurrent key → start-instant store shared by every interception point
 */

use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Correlates the start of a request with its completion
///
/// # Performance
/// - Sharded map: interceptors on different caller threads rarely contend
/// - `take_start` is a single remove, so a key is consumed at most once
#[derive(Clone)]
pub struct TimingCorrelator {
    starts: Arc<DashMap<String, Instant, RandomState>>,
}

impl TimingCorrelator {
    pub fn new() -> Self {
        Self {
            starts: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Record a start instant, replacing any stale entry for the key
    #[inline]
    pub fn record_start(&self, key: &str, at: Instant) {
        self.starts.insert(key.to_string(), at);
    }

    /// Read and remove the start instant for a key
    #[inline]
    pub fn take_start(&self, key: &str) -> Option<Instant> {
        self.starts.remove(key).map(|(_, at)| at)
    }

    /// Milliseconds between the recorded start and `now`, consuming the entry
    ///
    /// Absent when no start was recorded; that is a normal outcome.
    pub fn take_elapsed_ms(&self, key: &str, now: Instant) -> Option<f64> {
        self.take_start(key)
            .map(|start| now.saturating_duration_since(start).as_secs_f64() * 1000.0)
    }

    /// Drop entries whose start is older than `ttl` relative to `now`
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self, ttl: Duration, now: Instant) -> usize {
        let before = self.starts.len();
        self.starts
            .retain(|_, start| now.saturating_duration_since(*start) < ttl);
        before.saturating_sub(self.starts.len())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn clear(&self) {
        self.starts.clear();
    }
}

impl Default for TimingCorrelator {
    fn default() -> Self {
        Self::new()
    }
}
