// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Build the fetcher for the chosen subcommand
// 4. Run the crawl and print what it found
// 5. Exit with proper code (0 = crawl completed, 2 = couldn't start)
//
// Failed fetches do NOT change the exit code: they're reported, and the
// crawl carries on without them.
// =============================================================================

mod cli;           // src/cli.rs - command-line parsing
mod crawl;         // src/crawl/ - concurrent crawl engine
mod fetch;         // src/fetch/ - turning URLs into pages

use cli::{Cli, Commands, CrawlOptions};
use clap::Parser;  // Brings the parse() method into scope
use crawl::{CrawlEvent, CrawlReport, CrawlStats, Crawler};
use fetch::{CannedFetcher, Fetcher};
use std::sync::Arc;  // Shared ownership: the crawler and main both hold the fetcher
use std::time::Duration;
use tokio::sync::mpsc;  // Channel carrying crawl events to the printer task
use tracing_subscriber::EnvFilter;  // RUST_LOG-style log filtering

// anyhow::Result is like Result<T, anyhow::Error> - any error type converts into it
use anyhow::Result;

// #[tokio::main] turns this async fn into a normal main() that starts the runtime
#[tokio::main]
async fn main() {
    // Errors here mean the crawl never started (bad URL, bad config)
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match cli.command {
        Commands::Demo { seed, latency_ms, options } => {
            let tour = Arc::new(demo_fetcher(latency_ms));
            // Keep our own handle so we can read the fetch count afterwards
            let fetcher: Arc<dyn Fetcher> = tour.clone();
            let code = crawl_and_report(fetcher, &seed, &options).await?;
            if !options.json {
                println!("   🌐 Fetch calls: {}", tour.total_fetches());
            }
            Ok(code)
        }
        Commands::Site { website_url, options } => {
            // Fails early if the URL can't be parsed or has no domain
            let fetcher: Arc<dyn Fetcher> = Arc::new(fetch::HttpFetcher::for_seed(&website_url)?);
            crawl_and_report(fetcher, &website_url, &options).await
        }
    }
}

// The built-in graph, optionally slowed down so fetches overlap
fn demo_fetcher(latency_ms: u64) -> CannedFetcher {
    let tour = fetch::golang_tour();
    if latency_ms == 0 {
        return tour;
    }
    tour.with_latency(Duration::from_millis(latency_ms))
}

// Logs go to stderr so stdout only carries results (and stays valid JSON)
//
// RUST_LOG overrides the default, e.g. RUST_LOG=link_crawler=trace
fn init_logging(quiet: bool) {
    let default_level = if quiet { "link_crawler=warn" } else { "link_crawler=info" };
    // A set-but-invalid RUST_LOG also falls back to the default
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn crawl_and_report(
    fetcher: Arc<dyn Fetcher>,
    seed: &str,
    options: &CrawlOptions,
) -> Result<i32> {
    let crawler = Crawler::new(fetcher, options.crawl_config())?;

    // JSON mode: collect everything, print one document at the end
    if options.json {
        let report = crawler.run(seed).await;
        print_json(&report)?;
        return Ok(0);
    }

    println!("🔍 Crawling: {}", seed);
    println!("📊 Max crawl depth: {}", crawler.config().max_depth);

    // Print events live from a separate task while the crawl runs
    let (sender, receiver) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(receiver));
    let stats = crawler.run_streaming(seed, sender).await;
    // The sender was dropped when the crawl finished, so the printer ends too
    printer.await?;

    print_summary(&stats);
    Ok(0)
}

// Found pages go to stdout, failures to stderr
async fn print_events(mut receiver: mpsc::UnboundedReceiver<CrawlEvent>) {
    while let Some(event) = receiver.recv().await {
        match event {
            // {:?} prints the body quoted, like "Packages"
            CrawlEvent::Found { url, body, .. } => println!("found: {} {:?}", url, body),
            CrawlEvent::Failed { error, .. } => eprintln!("{}", error),
        }
    }
}

// Pretty-printed so the output is readable as well as machine-parseable
fn print_json(report: &CrawlReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    println!("{}", json_output);
    Ok(())
}

fn print_summary(stats: &CrawlStats) {
    println!();
    println!("📊 Summary:");
    println!("   ✅ Found: {}", stats.fetched);
    println!("   ❌ Not found: {}", stats.failed);
    println!("   🔁 Duplicates skipped: {}", stats.duplicates_skipped);
    println!("   🛑 Stopped by depth: {}", stats.depth_exhausted);
    println!("   🧵 Tasks spawned: {}", stats.tasks_spawned);
    println!("   ⚡ Peak concurrent fetches: {}", stats.peak_in_flight);
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does run() return Result<i32> instead of calling exit() itself?
//    - std::process::exit() skips destructors
//    - Keeping it in main() means everything in run() is cleaned up first
//
// 2. Why Arc<dyn Fetcher>?
//    - `dyn Fetcher` = "some type implementing Fetcher", chosen at runtime
//    - demo and site pick different fetchers, but the crawler code is the same
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_fetcher_without_latency_is_the_plain_tour() {
        assert_eq!(demo_fetcher(0).latency(), None);
    }

    #[test]
    fn test_demo_fetcher_applies_latency() {
        assert_eq!(demo_fetcher(25).latency(), Some(Duration::from_millis(25)));
    }
}
