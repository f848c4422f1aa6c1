// src/crawl/mod.rs
// =============================================================================
// This module handles the concurrent crawl.
//
// Pieces (leaf first):
// - visited: the shared set of URLs already seen (mark / is_visited / claim)
// - barrier: counts outstanding tasks so the caller knows when ALL are done
// - scheduler: spawns tasks, registering each one with the barrier first
// - config: depth limit, dedup policy, concurrency cap
// - report: events, counters and the final report
// - engine: the per-URL task logic and the Crawler that runs it
//
// Rust concepts:
// - Modules: One file per concern, re-exported here as a small public API
// =============================================================================

mod barrier;
mod config;
mod engine;
mod report;
mod scheduler;
mod visited;

pub use config::{CrawlConfig, DedupPolicy, DEFAULT_MAX_DEPTH};
pub use engine::Crawler;
pub use report::{CrawlEvent, CrawlReport, CrawlStats};
