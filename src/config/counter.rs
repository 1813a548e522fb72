// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sequences used to mint default task and stream names.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out distinct tokens, one per call, in strictly increasing order.
pub trait Sequence: Send + Sync {
    fn next(&self) -> String;
}

/// A standalone counter. Inject one per application (or per test) for deterministic names.
#[derive(Debug)]
pub struct AtomicCounter {
    next: AtomicU64,
}

impl AtomicCounter {
    /// Counter whose first token is `1`.
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    fn next_value(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence for AtomicCounter {
    fn next(&self) -> String {
        self.next_value().to_string()
    }
}

static PROCESS_COUNTER: AtomicCounter = AtomicCounter::new();

/// The process-wide counter. Tokens are unique within one process only.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCounter;

impl Sequence for ProcessCounter {
    fn next(&self) -> String {
        PROCESS_COUNTER.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn tokens_increase_from_one() {
        let counter = AtomicCounter::new();
        let tokens: Vec<String> = (0..4).map(|_| counter.next()).collect();
        assert_eq!(tokens, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn starting_point_is_configurable() {
        let counter = AtomicCounter::starting_at(100);
        assert_eq!(counter.next(), "100");
        assert_eq!(counter.next(), "101");
    }

    #[test]
    fn concurrent_callers_never_share_a_token() {
        let counter = Arc::new(AtomicCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || (0..500).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for token in handle.join().unwrap() {
                assert!(seen.insert(token), "duplicate token");
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn process_counter_is_shared() {
        let a = ProcessCounter.next().parse::<u64>().unwrap();
        let b = ProcessCounter.next().parse::<u64>().unwrap();
        assert!(b > a);
    }
}
