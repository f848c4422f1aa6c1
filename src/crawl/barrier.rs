// src/crawl/barrier.rs
// =============================================================================
// A join barrier for a task tree that grows while it runs.
//
// A plain "spawn N tasks and join them all" doesn't work for crawling: we
// don't know N up front, because every task may spawn more tasks. Instead we
// keep a counter of outstanding tasks:
//
// - enter() bumps the counter and hands back a BarrierGuard
// - dropping the guard decrements it (exactly once, even on early return)
// - wait() resolves once the counter is back to zero
//
// The parent calls enter() for a child BEFORE spawning it, and the parent's
// own guard is only dropped after it has finished spawning. So the counter
// can't touch zero while any descendant is still waiting to be launched.
//
// Rust concepts:
// - Atomics: Lock-free counters shared across threads
// - Drop: Code that runs automatically when a value goes out of scope
// - tokio::sync::Notify: Wake up async waiters
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Shared {
    outstanding: AtomicUsize,
    drained: Notify,
}

#[derive(Debug, Clone, Default)]
pub struct JoinBarrier {
    shared: Arc<Shared>,
}

impl JoinBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more outstanding task.
    ///
    /// The returned guard must be moved into that task; when it is dropped
    /// the task counts as finished.
    pub fn enter(&self) -> BarrierGuard {
        self.shared.outstanding.fetch_add(1, Ordering::SeqCst);
        BarrierGuard {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Number of tasks entered but not yet finished
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::SeqCst)
    }

    /// Waits until every entered task has finished.
    ///
    /// Returns immediately if nothing is outstanding.
    pub async fn wait(&self) {
        loop {
            // Register interest before checking the counter, otherwise a
            // notify_waiters() between the check and the await would be lost.
            let notified = self.shared.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }
}

#[must_use = "dropping the guard immediately marks the task as finished"]
#[derive(Debug)]
pub struct BarrierGuard {
    shared: Arc<Shared>,
}

impl Drop for BarrierGuard {
    fn drop(&mut self) {
        // AcqRel: everything this task did happens-before a waiter seeing zero
        let previous = self.shared.outstanding.fetch_sub(1, Ordering::AcqRel);
        if previous == 1 {
            self.shared.drained.notify_waiters();
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a guard instead of a `done()` method?
//    - A task can finish in several ways (depth exhausted, fetch failed,
//      finished dispatching), and each path would need to remember done()
//    - With Drop, the decrement happens on every path automatically
//    - It's the Rust version of `defer wg.Done()`
//
// 2. What does enable() do?
//    - notify_waiters() only wakes futures that are already registered
//    - enable() registers our future right away, before we read the counter
//    - Without it we could read 1, the last task finishes, and we sleep forever
//
// 3. Why #[must_use]?
//    - `barrier.enter();` on its own would drop the guard on the same line
//    - The compiler warns us if we forget to keep it
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_immediately_when_empty() {
        let barrier = JoinBarrier::new();
        barrier.wait().await;
        assert_eq!(barrier.outstanding(), 0);
    }

    #[test]
    fn test_guard_drop_decrements_once() {
        let barrier = JoinBarrier::new();
        let first = barrier.enter();
        let second = barrier.enter();
        assert_eq!(barrier.outstanding(), 2);

        drop(first);
        assert_eq!(barrier.outstanding(), 1);
        drop(second);
        assert_eq!(barrier.outstanding(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_wait_covers_tasks_spawned_by_tasks() {
        let barrier = JoinBarrier::new();
        let finished = Arc::new(AtomicUsize::new(0));

        let root = barrier.enter();
        let spawner = barrier.clone();
        let counter = Arc::clone(&finished);
        tokio::spawn(async move {
            let _root = root;
            for _ in 0..8 {
                let child = spawner.enter();
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let _child = child;
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        barrier.wait().await;
        assert_eq!(finished.load(Ordering::SeqCst), 8);
        assert_eq!(barrier.outstanding(), 0);
    }
}
