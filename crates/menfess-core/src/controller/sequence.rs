//! Request sequence numbers.
//!
//! Every search the controller starts is tagged with the next number. A
//! response may only be committed while its number is still the latest.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic request counter.
#[derive(Debug, Default)]
pub struct RequestSequence {
    counter: AtomicU64,
}

impl RequestSequence {
    /// Creates a counter; the first request gets number 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Tags a new request.
    #[must_use]
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of the most recently started request, 0 if none.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    /// True if no request has started since `seq`.
    #[must_use]
    pub fn is_latest(&self, seq: u64) -> bool {
        self.current() == seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_at_one() {
        let sequence = RequestSequence::new();
        assert_eq!(sequence.current(), 0);
        assert_eq!(sequence.next(), 1);
        assert_eq!(sequence.next(), 2);
        assert_eq!(sequence.current(), 2);
    }

    #[test]
    fn test_only_latest_is_latest() {
        let sequence = RequestSequence::new();
        let first = sequence.next();
        assert!(sequence.is_latest(first));
        let second = sequence.next();
        assert!(!sequence.is_latest(first));
        assert!(sequence.is_latest(second));
    }

    #[test]
    fn test_uniqueness() {
        let sequence = RequestSequence::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10000 {
            assert!(seen.insert(sequence.next()), "duplicate sequence number");
        }
    }
}
