// src/crawl/scheduler.rs
// =============================================================================
// The one place where crawl tasks get spawned.
//
// submit() does two things, always in this order:
// 1. Register the task with the JoinBarrier (counter goes up)
// 2. tokio::spawn the task, moving the barrier guard into it
//
// Because every spawn goes through here, "increment before dispatch, decrement
// exactly once when done" holds for every task in the tree.
//
// Optional concurrency cap:
// - With a limit, each task waits for a Semaphore permit before running
// - Spawning itself never waits, so a parent never blocks on its children
// - Waiting tasks are cheap parked futures; only permit holders do real work
//
// Rust concepts:
// - Generics with trait bounds: any `Future + Send + 'static` can be submitted
// - Arc<Semaphore>: Shared permit pool across tasks
// =============================================================================

use super::barrier::JoinBarrier;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct Scheduler {
    barrier: JoinBarrier,
    permits: Option<Arc<Semaphore>>,
}

impl Scheduler {
    /// `max_concurrency = None` means every submitted task runs immediately
    pub fn new(max_concurrency: Option<usize>) -> Self {
        Self {
            barrier: JoinBarrier::new(),
            permits: max_concurrency.map(|limit| Arc::new(Semaphore::new(limit))),
        }
    }

    pub fn submit<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = self.barrier.enter();
        let permits = self.permits.clone();

        tokio::spawn(async move {
            let _guard = guard;

            let _permit = match permits {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    // The semaphore is never closed, but if it were there'd be
                    // nothing left to run under.
                    Err(_) => return,
                },
                None => None,
            };

            task.await;
        });
    }

    /// Waits until every submitted task, and everything they submitted, is done
    pub async fn wait(&self) {
        self.barrier.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_wait_sees_every_submitted_task() {
        let scheduler = Scheduler::new(None);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let done = Arc::clone(&done);
            scheduler.submit(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }

        scheduler.wait().await;
        assert_eq!(done.load(Ordering::SeqCst), 10);
        assert_eq!(scheduler.barrier.outstanding(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cap_limits_running_tasks() {
        let scheduler = Scheduler::new(Some(2));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            scheduler.submit(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(15)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }

        scheduler.wait().await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_capped_tasks_can_submit_children() {
        // A single permit and a task that submits more work must not deadlock
        let scheduler = Scheduler::new(Some(1));
        let done = Arc::new(AtomicUsize::new(0));

        let inner = scheduler.clone();
        let counter = Arc::clone(&done);
        scheduler.submit(async move {
            for _ in 0..3 {
                let counter = Arc::clone(&counter);
                inner.submit(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        tokio::time::timeout(Duration::from_secs(5), scheduler.wait())
            .await
            .expect("scheduler drained");
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }
}
