// src/crawl/config.rs
// =============================================================================
// Knobs for a single crawl run.
//
// - max_depth: how many link hops to follow (the seed counts as hop 1)
// - dedup: how strictly "visit each URL once" is enforced
// - max_concurrency: optional cap on tasks running at the same time
//
// Rust concepts:
// - Default trait: Sensible defaults in one place
// - clap::ValueEnum: Lets an enum be parsed straight from a CLI flag
// - thiserror: Error type for invalid settings
// =============================================================================

use clap::ValueEnum;
use serde::Serialize;

/// Depth used when nothing else is configured
pub const DEFAULT_MAX_DEPTH: usize = 4;

// How the crawler avoids visiting a URL twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// Claim each URL atomically before dispatching it: every URL is fetched at most once
    #[default]
    Strict,
    /// Check, then mark after fetching: concurrent tasks may fetch the same URL twice
    BestEffort,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max concurrency must be greater than 0")]
    ZeroConcurrency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlConfig {
    pub max_depth: usize,
    pub dedup: DedupPolicy,
    /// `None` = every discovered URL gets its own task right away
    pub max_concurrency: Option<usize>,
}

impl CrawlConfig {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == Some(0) {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            dedup: DedupPolicy::Strict,
            max_concurrency: None,
        }
    }
}
