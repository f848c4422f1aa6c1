// src/fetch/http.rs
// =============================================================================
// A Fetcher that downloads real pages over HTTP.
//
// How it works:
// 1. GET the page (10 second timeout)
// 2. Treat anything other than 2xx as "not found"
// 3. Parse the HTML and collect every <a href> link
// 4. Resolve relative links against the page URL
// 5. Keep only http(s) links on the same domain as the seed
//
// This type does NOT walk the site itself. It fetches exactly one page; the
// crawl engine decides what to visit next and how many pages run at once.
//
// Rust concepts:
// - Url: For parsing and comparing domains
// - scraper: CSS selectors over a parsed HTML document
// =============================================================================

use super::{FetchError, FetchedPage, Fetcher};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

pub struct HttpFetcher {
    client: Client,
    // Only links on this domain are reported back to the crawler
    base_domain: String,
}

impl HttpFetcher {
    // Builds a fetcher restricted to the seed URL's domain
    //
    // Fails if the seed is not a valid URL or has no domain (e.g. file://)
    pub fn for_seed(seed_url: &str) -> Result<Self> {
        let seed = Url::parse(seed_url)
            .map_err(|e| anyhow!("Invalid URL '{}': {}", seed_url, e))?;

        let base_domain = seed
            .domain()
            .ok_or_else(|| anyhow!("URL has no domain: {}", seed_url))?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_domain,
        })
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP {}", response.status()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let html = match self.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                // The crawler only knows "not found"; keep the real reason in the logs
                tracing::debug!(%url, reason = %e, "http fetch failed");
                return Err(FetchError::NotFound(url.to_string()));
            }
        };

        let urls = extract_same_domain_links(&html, url, &self.base_domain);
        let body = page_title(&html).unwrap_or_default();

        Ok(FetchedPage::new(body, urls))
    }
}

// Returns the trimmed <title> text, used as the page payload in reports
fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

// Extracts links from HTML that are on the same domain
//
// Parameters:
//   html: The HTML content to parse
//   page_url: The URL of the current page (for resolving relative links)
//   base_domain: The domain we're restricting crawling to
//
// Returns: absolute URLs on the same domain, in document order
fn extract_same_domain_links(html: &str, page_url: &str, base_domain: &str) -> Vec<String> {
    let mut links = Vec::new();

    let base = match Url::parse(page_url) {
        Ok(url) => url,
        Err(_) => return links,
    };

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    let document = Html::parse_document(html);

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(absolute) = resolve_link(&base, href) else {
            continue;
        };

        if (absolute.scheme() == "http" || absolute.scheme() == "https")
            && absolute.domain() == Some(base_domain)
        {
            links.push(absolute.to_string());
        }
    }

    links
}

// Resolves a link (possibly relative) to an absolute URL
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    // Skip anchors and special protocols
    if href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    // "/docs#intro" and "/docs" are the same page
    url.set_fragment(None);
    Some(url)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is Html parsed inside plain (non-async) functions?
//    - scraper's Html type is not Send
//    - If it lived across an .await, the future couldn't be moved between
//      threads and tokio::spawn would reject it
//    - Parsing in a sync helper means it's dropped before we ever await
//
// 2. What is let-else?
//    - `let Some(x) = ... else { continue; };`
//    - Binds x if the pattern matches, otherwise runs the else block
//    - The else block must leave the current scope (continue/return/break)
//
// 3. Why remove the fragment?
//    - The crawler compares URLs as plain strings
//    - Without this, page#a and page#b would be fetched twice
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_link() {
        let base = Url::parse("https://example.com/page").unwrap();
        let result = resolve_link(&base, "https://other.com");
        assert_eq!(result.map(|u| u.to_string()), Some("https://other.com/".to_string()));
    }

    #[test]
    fn test_resolve_relative_link_drops_fragment() {
        let base = Url::parse("https://example.com/page").unwrap();
        let result = resolve_link(&base, "/docs#intro");
        assert_eq!(result.map(|u| u.to_string()), Some("https://example.com/docs".to_string()));
    }

    #[test]
    fn test_skip_anchor_and_mailto() {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(resolve_link(&base, "#section"), None);
        assert_eq!(resolve_link(&base, "mailto:test@example.com"), None);
    }

    #[test]
    fn test_only_same_domain_links_in_document_order() {
        let html = r#"
            <a href="/b">B</a>
            <a href="https://other.com/x">Elsewhere</a>
            <a href="https://example.com/a">A</a>
            <a href="javascript:void(0)">Nothing</a>
        "#;
        let links = extract_same_domain_links(html, "https://example.com/", "example.com");
        assert_eq!(links, vec!["https://example.com/b", "https://example.com/a"]);
    }

    #[test]
    fn test_page_title() {
        let html = "<html><head><title>  Packages </title></head><body></body></html>";
        assert_eq!(page_title(html), Some("Packages".to_string()));
        assert_eq!(page_title("<p>no title</p>"), None);
    }

    #[test]
    fn test_seed_without_domain_is_rejected() {
        assert!(HttpFetcher::for_seed("not a url").is_err());
        assert!(HttpFetcher::for_seed("file:///tmp/index.html").is_err());
    }
}
