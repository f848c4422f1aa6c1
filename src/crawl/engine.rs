// src/crawl/engine.rs
// =============================================================================
// The concurrent crawl itself.
//
// Every URL gets its own task. A task:
// 1. Stops right away if its depth budget is used up
// 2. Fetches its URL (a failure is reported and ends this task only)
// 3. Marks the URL as visited and emits a Found event
// 4. Hands every new link to the scheduler with depth - 1
// 5. Returns WITHOUT waiting for those children
//
// Nobody joins individual tasks. The run as a whole waits on the scheduler's
// join barrier, which only drains once every task in the tree has finished.
//
// Dedup policies:
// - Strict: a link is dispatched only if VisitedSet::claim() says it's new.
//   The claim is atomic, so each URL is fetched at most once per run.
// - BestEffort: is_visited() before dispatch, mark() after fetching. Two tasks
//   finding the same link at the same moment can both dispatch it.
//
// Each run builds its own RunContext (visited set, scheduler, stats, event
// sender), so separate runs never share state.
// =============================================================================

use super::config::{ConfigError, CrawlConfig, DedupPolicy};
use super::report::{CrawlEvent, CrawlReport, CrawlStats, StatsCounters};
use super::scheduler::Scheduler;
use super::visited::VisitedSet;
use crate::fetch::Fetcher;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    config: CrawlConfig,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: CrawlConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { fetcher, config })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    // Crawls from `seed` and collects every event into a report
    pub async fn run(&self, seed: &str) -> CrawlReport {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let (stats, visited) = self.crawl(seed, sender).await;

        let mut report = CrawlReport::new(seed, self.config.max_depth, self.config.dedup);
        // Every sender lived inside the run context, which is gone by now
        while let Some(event) = receiver.recv().await {
            report.record(event);
        }
        report.stats = stats;
        report.visited = visited;
        report
    }

    // Crawls from `seed`, sending events as they happen
    //
    // Returns once the whole task tree has finished.
    pub async fn run_streaming(
        &self,
        seed: &str,
        events: mpsc::UnboundedSender<CrawlEvent>,
    ) -> CrawlStats {
        let (stats, _) = self.crawl(seed, events).await;
        stats
    }

    // Runs one crawl to completion; returns the counters and every URL that
    // ended up in the visited set
    async fn crawl(
        &self,
        seed: &str,
        events: mpsc::UnboundedSender<CrawlEvent>,
    ) -> (CrawlStats, Vec<String>) {
        info!(
            %seed,
            max_depth = self.config.max_depth,
            dedup = ?self.config.dedup,
            max_concurrency = ?self.config.max_concurrency,
            "crawl started"
        );

        let ctx = Arc::new(RunContext {
            fetcher: Arc::clone(&self.fetcher),
            visited: VisitedSet::new(),
            scheduler: Scheduler::new(self.config.max_concurrency),
            events,
            stats: StatsCounters::default(),
            dedup: self.config.dedup,
        });

        if ctx.dedup == DedupPolicy::Strict {
            ctx.visited.claim(seed);
        }
        ctx.spawn(seed.to_string(), self.config.max_depth);

        ctx.scheduler.wait().await;

        let stats = ctx.stats.snapshot();
        info!(
            fetched = stats.fetched,
            failed = stats.failed,
            visited = ctx.visited.len(),
            "crawl finished"
        );
        (stats, ctx.visited.snapshot())
    }
}

// Shared by every task of one run
struct RunContext {
    fetcher: Arc<dyn Fetcher>,
    visited: VisitedSet,
    scheduler: Scheduler,
    events: mpsc::UnboundedSender<CrawlEvent>,
    stats: StatsCounters,
    dedup: DedupPolicy,
}

impl RunContext {
    fn spawn(self: &Arc<Self>, url: String, depth: usize) {
        self.stats.task_spawned();
        self.scheduler.submit(traverse(Arc::clone(self), url, depth));
    }

    // Decides whether a discovered link becomes a new task
    fn dispatch_link(self: &Arc<Self>, url: String, depth: usize) {
        match self.dedup {
            DedupPolicy::Strict => {
                // Claiming a link that could never be fetched would hide it
                // from a shorter path that reaches it later.
                if depth == 0 {
                    trace!(%url, "no depth left, not dispatching");
                    self.stats.depth_exhausted();
                    return;
                }
                if !self.visited.claim(&url) {
                    trace!(%url, "already claimed");
                    self.stats.duplicate_skipped();
                    return;
                }
            }
            DedupPolicy::BestEffort => {
                if self.visited.is_visited(&url) {
                    trace!(%url, "already visited");
                    self.stats.duplicate_skipped();
                    return;
                }
            }
        }

        self.spawn(url, depth);
    }

    fn emit(&self, event: CrawlEvent) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.events.send(event);
    }
}

// Boxed so the future type doesn't contain itself (tasks spawn tasks)
fn traverse(ctx: Arc<RunContext>, url: String, depth: usize) -> BoxFuture<'static, ()> {
    async move {
        if depth == 0 {
            trace!(%url, "depth exhausted");
            ctx.stats.depth_exhausted();
            return;
        }

        ctx.stats.fetch_started();
        let result = ctx.fetcher.fetch(&url).await;
        ctx.stats.fetch_finished(result.is_ok());

        let page = match result {
            Ok(page) => page,
            Err(error) => {
                warn!(%url, %error, "fetch failed");
                ctx.emit(CrawlEvent::Failed { url, error });
                return;
            }
        };

        ctx.visited.mark(&url);
        info!(%url, body = %page.body, depth, links = page.urls.len(), "found");
        ctx.emit(CrawlEvent::Found {
            url,
            body: page.body,
            depth,
        });

        for link in page.urls {
            ctx.dispatch_link(link, depth - 1);
        }
    }
    .boxed()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why BoxFuture?
//    - An async fn's future type includes everything it awaits or stores
//    - traverse() spawns more traverse() futures, so without boxing the type
//      would have to contain itself (infinite size)
//    - .boxed() puts it behind a pointer with a fixed, known type
//
// 2. Why self: &Arc<Self>?
//    - spawn() needs to hand a new Arc clone to the child task
//    - Taking &Arc<Self> lets us call Arc::clone(self) from inside a method
//
// 3. Why is the channel unbounded?
//    - Tasks must never block on reporting; the number of events is at most
//      the number of tasks, which the depth limit already bounds
// -----------------------------------------------------------------------------
