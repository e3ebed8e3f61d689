//! Candidate Set Service
//!
//! Per-request bookkeeping for the failover loop. Pure logic: the random
//! source is injected so selection can be tested deterministically.

use rand::Rng;

/// Owned, per-request list of endpoints still worth trying.
///
/// Seeded from an immutable pool snapshot; evictions only affect this
/// request. The attempt budget is fixed at the seed length, so a pool of N
/// endpoints makes at most N attempts no matter how many picks land on an
/// endpoint that keeps failing.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    remaining: Vec<String>,
    attempts_left: usize,
}

impl CandidateSet {
    pub fn new(candidates: Vec<String>) -> Self {
        let attempts_left = candidates.len();
        Self {
            remaining: candidates,
            attempts_left,
        }
    }

    /// Pick a candidate uniformly at random.
    ///
    /// Returns `None` once the attempt budget is spent or every candidate
    /// has been evicted. The returned index is only valid until the next
    /// eviction.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, &str)> {
        if self.attempts_left == 0 || self.remaining.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.remaining.len());
        Some((index, self.remaining[index].as_str()))
    }

    /// Remove a candidate for the rest of this request.
    pub fn evict(&mut self, index: usize) -> Option<String> {
        (index < self.remaining.len()).then(|| self.remaining.remove(index))
    }

    /// Consume one attempt.
    pub fn spend_attempt(&mut self) {
        self.attempts_left = self.attempts_left.saturating_sub(1);
    }

    pub fn attempts_left(&self) -> usize {
        self.attempts_left
    }

    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}
