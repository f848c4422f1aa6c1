// src/fetch/mod.rs
// =============================================================================
// This module defines how pages get fetched.
//
// The crawler itself never talks to the network directly. It only knows about
// the `Fetcher` trait: "give me a URL, I'll give you back the page body and
// the links found on it (or an error)".
//
// Implementations:
// - canned: an in-memory link graph (used by the `demo` command and tests)
// - http: real HTTP requests + HTML link extraction (used by `site`)
//
// Rust concepts:
// - Traits: Shared behavior that different types can implement
// - async_trait: Lets a trait have async methods and still be used as `dyn`
// - thiserror: Derives std::error::Error for our error types
// =============================================================================

mod canned;
mod http;

pub use canned::golang_tour;
pub use canned::CannedFetcher;
pub use http::HttpFetcher;

use async_trait::async_trait;

// What a successful fetch gives back
//
// `urls` keeps the order in which links appeared on the page; the crawler
// dispatches children in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The page payload (title, text, raw HTML - the crawler doesn't care)
    pub body: String,
    /// Links discovered on the page, in document order
    pub urls: Vec<String>,
}

impl FetchedPage {
    pub fn new(body: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            body: body.into(),
            urls,
        }
    }
}

// The one and only way a fetch can fail
//
// Fetch failures are local to the task that hit them: they get reported
// and the task ends, nothing else is affected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The URL could not be resolved to a page
    #[error("not found: {0}")]
    NotFound(String),
}

// Anything that can turn a URL into a page
//
// `Send + Sync` is required because one fetcher is shared (behind an Arc)
// by every concurrent crawl task.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait instead of calling reqwest directly?
//    - The crawl logic is about concurrency, not HTTP
//    - Tests can plug in a fake fetcher with a fixed link graph
//    - No network needed to test the tricky parts
//
// 2. Why #[async_trait]?
//    - We store the fetcher as Arc<dyn Fetcher> and call it from spawned tasks
//    - async_trait boxes the returned future so the trait stays object-safe
//      and the future is Send (required by tokio::spawn)
//
// 3. What does thiserror do?
//    - #[error("not found: {0}")] generates the Display impl
//    - It also implements std::error::Error so `?` and anyhow work with it
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::NotFound("https://golang.org/cmd/".to_string());
        assert_eq!(err.to_string(), "not found: https://golang.org/cmd/");
    }
}
