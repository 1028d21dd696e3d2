// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Version id generation.
//!
//! Ids are decimal nanosecond timestamps. A process-wide high-water mark
//! keeps them strictly increasing even when the wall clock stalls or steps
//! backwards, so two ids handed out by one process never collide.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Generate a fresh, practically unique version id.
pub fn new_version_id() -> String {
    let now = now_nanos();
    let mut prev = LAST_ISSUED.load(Ordering::SeqCst);
    loop {
        let next = now.max(prev + 1);
        match LAST_ISSUED.compare_exchange_weak(prev, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next.to_string(),
            Err(actual) => prev = actual,
        }
    }
}

/// Order version ids chronologically: numeric ids by value, others after
/// them lexicographically.
pub fn compare_version_ids(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u128>(), b.parse::<u128>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_strictly_increase() {
        let ids: Vec<u64> = (0..1000).map(|_| new_version_id().parse().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..500).map(|_| new_version_id()).collect::<Vec<_>>()))
            .collect();
        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "duplicate version id");
            }
        }
    }

    #[test]
    fn test_compare_numeric_not_lexicographic() {
        use std::cmp::Ordering;
        assert_eq!(compare_version_ids("9", "10"), Ordering::Less);
        assert_eq!(compare_version_ids("10", "legacy"), Ordering::Less);
        assert_eq!(compare_version_ids("a", "b"), Ordering::Less);
    }
}
