// src/crawl/report.rs
// =============================================================================
// What a crawl produces.
//
// - CrawlEvent: one message per fetched page or failed fetch, sent while the
//   crawl is still running
// - CrawlStats: counters kept by the running tasks (atomics), snapshotted at
//   the end
// - CrawlReport: everything collected after the run, ready for JSON output
//
// Rust concepts:
// - serde Serialize: Turn structs into JSON
// - Atomics: Counters that many tasks bump without a lock
// =============================================================================

use super::config::DedupPolicy;
use crate::fetch::FetchError;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

// Emitted by crawl tasks as they go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A page was fetched. `depth` is the remaining budget it was fetched with.
    Found {
        url: String,
        body: String,
        depth: usize,
    },
    /// A fetch failed; the task that hit it stopped there
    Failed { url: String, error: FetchError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub body: String,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub url: String,
    pub error: String,
}

// Final counter values for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Successful fetches
    pub fetched: usize,
    /// Failed fetches
    pub failed: usize,
    /// Discovered links skipped because they were already visited/claimed
    pub duplicates_skipped: usize,
    /// Tasks (or links) that ran out of depth budget
    pub depth_exhausted: usize,
    /// Tasks handed to the scheduler, seed included
    pub tasks_spawned: usize,
    /// Most fetches ever in flight at the same moment
    pub peak_in_flight: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    fetched: AtomicUsize,
    failed: AtomicUsize,
    duplicates_skipped: AtomicUsize,
    depth_exhausted: AtomicUsize,
    tasks_spawned: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StatsCounters {
    pub(crate) fn fetch_started(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    pub(crate) fn fetch_finished(&self, ok: bool) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let counter = if ok { &self.fetched } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn duplicate_skipped(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn depth_exhausted(&self) {
        self.depth_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_spawned(&self) {
        self.tasks_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CrawlStats {
        CrawlStats {
            fetched: self.fetched.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::SeqCst),
            depth_exhausted: self.depth_exhausted.load(Ordering::SeqCst),
            tasks_spawned: self.tasks_spawned.load(Ordering::SeqCst),
            peak_in_flight: self.peak_in_flight.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    pub max_depth: usize,
    pub dedup: DedupPolicy,
    /// Pages in the order they were found (not deterministic across runs)
    pub pages: Vec<PageRecord>,
    pub failures: Vec<FailureRecord>,
    /// Every URL marked or claimed during the run, sorted
    pub visited: Vec<String>,
    pub stats: CrawlStats,
}

impl CrawlReport {
    pub fn new(seed: &str, max_depth: usize, dedup: DedupPolicy) -> Self {
        Self {
            seed: seed.to_string(),
            max_depth,
            dedup,
            pages: Vec::new(),
            failures: Vec::new(),
            visited: Vec::new(),
            stats: CrawlStats::default(),
        }
    }

    pub fn record(&mut self, event: CrawlEvent) {
        match event {
            CrawlEvent::Found { url, body, depth } => {
                self.pages.push(PageRecord { url, body, depth });
            }
            CrawlEvent::Failed { url, error } => {
                self.failures.push(FailureRecord {
                    url,
                    error: error.to_string(),
                });
            }
        }
    }

    /// URLs of every fetched page, sorted (handy for comparing runs)
    #[cfg(test)]
    pub fn found_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.pages.iter().map(|p| p.url.as_str()).collect();
        urls.sort_unstable();
        urls
    }
}
