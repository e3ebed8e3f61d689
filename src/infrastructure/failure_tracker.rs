//! Failure Tracker
//!
//! Per-endpoint consecutive-failure counts, kept in memory only. Used to
//! demote flaky endpoints without touching the durable store.

use dashmap::DashMap;

/// Consecutive-failure counters keyed by endpoint URL.
///
/// Absence of an entry means a count of 0. Counts survive across requests
/// and are cleared in bulk only when the pool is reloaded.
///
/// Concurrent increments for the same endpoint are applied under the
/// DashMap shard lock, so none are lost.
#[derive(Debug, Default)]
pub struct FailureTracker {
    counts: DashMap<String, u32>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self {
            counts: DashMap::new(),
        }
    }

    /// Increment the count for `url`, starting at 1 if untracked.
    pub fn record_failure(&self, url: &str) -> u32 {
        let mut entry = self.counts.entry(url.to_string()).or_insert(0);
        let next = entry.saturating_add(1);
        *entry = next;
        next
    }

    /// Reset the count for `url` after a successful call.
    pub fn record_success(&self, url: &str) {
        if let Some(mut entry) = self.counts.get_mut(url) {
            *entry = 0;
        }
    }

    /// Current count for `url`.
    ///
    /// Querying creates a tracked entry (count 0) when none exists. Use
    /// [`FailureTracker::peek`] to read without that side effect.
    pub fn failure_count(&self, url: &str) -> u32 {
        *self.counts.entry(url.to_string()).or_insert(0)
    }

    /// Current count for `url` without creating an entry.
    pub fn peek(&self, url: &str) -> Option<u32> {
        self.counts.get(url).map(|c| *c)
    }

    /// Number of tracked endpoints.
    pub fn tracked(&self) -> usize {
        self.counts.len()
    }

    /// Forget every count.
    pub fn clear(&self) {
        self.counts.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::sync::Arc;

    const URL: &str = "http://a.example";

    #[test]
    fn test_untracked_count_is_zero() {
        let tracker = FailureTracker::new();
        assert_eq!(tracker.peek(URL), None);
        assert_eq!(tracker.failure_count(URL), 0);
    }

    #[test]
    fn test_failure_count_creates_entry() {
        let tracker = FailureTracker::new();
        assert_eq!(tracker.tracked(), 0);

        tracker.failure_count(URL);
        assert_eq!(tracker.tracked(), 1);
        assert_eq!(tracker.peek(URL), Some(0));
    }

    #[test]
    fn test_peek_does_not_create_entry() {
        let tracker = FailureTracker::new();
        tracker.peek(URL);
        assert_eq!(tracker.tracked(), 0);
    }

    #[test]
    fn test_record_failure_increments() {
        let tracker = FailureTracker::new();
        assert_eq!(tracker.record_failure(URL), 1);
        assert_eq!(tracker.record_failure(URL), 2);
        assert_eq!(tracker.failure_count(URL), 2);
    }

    #[test]
    fn test_record_success_resets() {
        let tracker = FailureTracker::new();
        tracker.record_failure(URL);
        tracker.record_failure(URL);
        tracker.record_success(URL);
        assert_eq!(tracker.failure_count(URL), 0);
    }

    #[test]
    fn test_record_success_does_not_track() {
        let tracker = FailureTracker::new();
        tracker.record_success(URL);
        assert_eq!(tracker.tracked(), 0);
    }

    #[test]
    fn test_clear() {
        let tracker = FailureTracker::new();
        tracker.record_failure(URL);
        tracker.record_failure("http://b.example");
        tracker.clear();
        assert_eq!(tracker.tracked(), 0);
        assert_eq!(tracker.failure_count(URL), 0);
    }

    #[tokio::test]
    async fn test_concurrent_failures() {
        let tracker = Arc::new(FailureTracker::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    tracker.record_failure(URL);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(tracker.failure_count(URL), 200);
    }
}
