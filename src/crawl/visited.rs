// src/crawl/visited.rs
// =============================================================================
// The shared "have we seen this URL yet?" set.
//
// Every crawl task holds a clone of the same VisitedSet. Clones are cheap
// (they share one Arc) and every operation takes the lock for a single
// HashSet call, so critical sections stay tiny.
//
// Two ways to use it:
// - mark() + is_visited(): separate steps. Between the check and the mark
//   another task can slip in, so two tasks may both decide a URL is new.
// - claim(): check and insert under ONE lock. Exactly one caller ever gets
//   `true` for a given URL, which makes it safe as a dispatch gate.
//
// Rust concepts:
// - Arc<Mutex<T>>: Shared, mutable state across threads
// - HashSet: O(1) membership checks
// =============================================================================

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` as visited. Marking twice is a no-op.
    pub fn mark(&self, url: &str) {
        self.lock().insert(url.to_string());
    }

    /// Whether `url` has been marked or claimed.
    ///
    /// The answer can be stale as soon as the lock is released.
    pub fn is_visited(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Atomically marks `url`, returning `true` only if it was not yet present.
    pub fn claim(&self, url: &str) -> bool {
        // insert() reports whether the value was new, all under the one lock
        self.lock().insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Sorted copy of every visited URL
    pub fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.lock().iter().cloned().collect();
        urls.sort();
        urls
    }

    // A panic while holding the lock can't leave the set half-updated (each
    // critical section is one HashSet call), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why std::sync::Mutex and not tokio::sync::Mutex?
//    - We never hold the lock across an .await
//    - The std mutex is faster for short, synchronous critical sections
//    - tokio's mutex is for when you must await while holding the lock
//
// 2. What is lock poisoning?
//    - If a thread panics while holding a std Mutex, the mutex is "poisoned"
//    - lock() then returns Err so you can decide whether the data is still OK
//    - into_inner() says "yes, use it anyway"
//
// 3. Why does Clone share the data?
//    - #[derive(Clone)] clones the Arc, not the HashSet
//    - Every clone points at the same set
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_idempotent() {
        let visited = VisitedSet::new();
        assert!(!visited.is_visited("a"));

        visited.mark("a");
        visited.mark("a");
        visited.mark("a");

        assert!(visited.is_visited("a"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_claim_only_succeeds_once() {
        let visited = VisitedSet::new();
        assert!(visited.claim("a"));
        assert!(!visited.claim("a"));
        assert!(visited.is_visited("a"));
    }

    #[test]
    fn test_claim_after_mark_fails() {
        let visited = VisitedSet::new();
        visited.mark("a");
        assert!(!visited.claim("a"));
    }

    #[test]
    fn test_clones_share_state() {
        let visited = VisitedSet::new();
        let other = visited.clone();
        other.mark("b");
        assert!(visited.is_visited("b"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let visited = VisitedSet::new();
        visited.mark("https://golang.org/pkg/os/");
        visited.claim("https://golang.org/");
        visited.mark("https://golang.org/pkg/");
        visited.mark("https://golang.org/");

        assert_eq!(
            visited.snapshot(),
            vec![
                "https://golang.org/".to_string(),
                "https://golang.org/pkg/".to_string(),
                "https://golang.org/pkg/os/".to_string(),
            ]
        );
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let visited = VisitedSet::new();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let visited = visited.clone();
                std::thread::spawn(move || visited.claim("contested"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(visited.len(), 1);
    }
}
