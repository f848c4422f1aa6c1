// src/fetch/canned.rs
// =============================================================================
// An in-memory fetcher that serves pages from a fixed link graph.
//
// Used by:
// - the `demo` command (the golang.org tour graph below)
// - every crawl test (no network, deterministic graphs)
//
// It can also pretend to be slow (a fixed sleep per fetch) so tests can force
// many tasks to overlap, and it counts how many times each URL was fetched so
// tests can check "fetched at most once".
// =============================================================================

use super::{FetchError, FetchedPage, Fetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct CannedFetcher {
    pages: HashMap<String, FetchedPage>,
    latency: Option<Duration>,
    // url -> number of fetch calls (hits and misses)
    calls: Mutex<HashMap<String, usize>>,
}

impl CannedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page to the graph (builder style)
    pub fn page(mut self, url: &str, body: &str, links: &[&str]) -> Self {
        let urls = links.iter().map(|link| link.to_string()).collect();
        self.pages
            .insert(url.to_string(), FetchedPage::new(body, urls));
        self
    }

    /// Makes every fetch sleep first, simulating network latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// The per-fetch delay, if any
    #[cfg(test)]
    pub fn latency(&self) -> Option<Duration> {
        self.latency
    }

    /// How many times `url` has been fetched so far
    #[cfg(test)]
    pub fn fetch_count(&self, url: &str) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.get(url).copied().unwrap_or(0)
    }

    /// Total fetch calls across all URLs
    pub fn total_fetches(&self) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.values().sum()
    }

    fn record_call(&self, url: &str) {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        *calls.entry(url.to_string()).or_insert(0) += 1;
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.record_call(url);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

// The demo graph: a few golang.org pages that link back to each other.
// `https://golang.org/cmd/` is linked from two pages but is not in the map,
// so it always fails with "not found".
pub fn golang_tour() -> CannedFetcher {
    CannedFetcher::new()
        .page(
            "https://golang.org/",
            "The Go Programming Language",
            &["https://golang.org/pkg/", "https://golang.org/cmd/"],
        )
        .page(
            "https://golang.org/pkg/",
            "Packages",
            &[
                "https://golang.org/",
                "https://golang.org/cmd/",
                "https://golang.org/pkg/fmt/",
                "https://golang.org/pkg/os/",
            ],
        )
        .page(
            "https://golang.org/pkg/fmt/",
            "Package fmt",
            &["https://golang.org/", "https://golang.org/pkg/"],
        )
        .page(
            "https://golang.org/pkg/os/",
            "Package os",
            &["https://golang.org/", "https://golang.org/pkg/"],
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_page_is_served_in_order() {
        let fetcher = golang_tour();
        let page = fetcher.fetch("https://golang.org/pkg/").await.unwrap();
        assert_eq!(page.body, "Packages");
        assert_eq!(page.urls[0], "https://golang.org/");
        assert_eq!(page.urls[3], "https://golang.org/pkg/os/");
    }

    #[tokio::test]
    async fn test_unknown_page_is_not_found() {
        let fetcher = golang_tour();
        let err = fetcher.fetch("https://golang.org/cmd/").await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("https://golang.org/cmd/".to_string()));
    }

    #[tokio::test]
    async fn test_latency_delays_every_fetch() {
        let fetcher = golang_tour().with_latency(Duration::from_millis(20));
        let start = std::time::Instant::now();
        let _ = fetcher.fetch("https://golang.org/").await;
        let _ = fetcher.fetch("https://golang.org/cmd/").await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_calls_are_counted_for_hits_and_misses() {
        let fetcher = CannedFetcher::new().page("a", "A", &[]);
        let _ = fetcher.fetch("a").await;
        let _ = fetcher.fetch("a").await;
        let _ = fetcher.fetch("missing").await;

        assert_eq!(fetcher.fetch_count("a"), 2);
        assert_eq!(fetcher.fetch_count("missing"), 1);
        assert_eq!(fetcher.fetch_count("never"), 0);
        assert_eq!(fetcher.total_fetches(), 3);
    }
}
