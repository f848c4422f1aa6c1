// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - demo: crawl a small built-in link graph (no network needed)
// - site: crawl a real website over HTTP
//
// Both share the same crawl options (depth, dedup policy, concurrency cap,
// output format). Every option can also come from an environment variable.
//
// Rust concepts:
// - #[command(flatten)]: Reuse one group of arguments in several subcommands
// - #[arg(env = ...)]: Fall back to an environment variable
// =============================================================================

// Our own config types; the CLI only translates flags into these
use crate::crawl::{CrawlConfig, DedupPolicy, DEFAULT_MAX_DEPTH};
// Args = a reusable group of flags, Parser = the top-level CLI,
// Subcommand = the enum of commands
use clap::{Args, Parser, Subcommand};

// This struct represents our entire CLI application
//
// `version` with no value makes clap use the version from Cargo.toml
#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "Crawl links concurrently, visiting every page at most once",
    long_about = "link-crawler starts from a seed URL and follows links up to a maximum depth. \
                  Every discovered page is fetched in its own task; the run ends when the whole \
                  task tree has finished."
)]
pub struct Cli {
    // Which subcommand was used (demo or site)
    #[command(subcommand)]
    pub command: Commands,

    /// Only log warnings and errors
    ///
    /// `global = true` lets the flag appear before or after the subcommand
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

// This enum defines our subcommands
//
// Each variant's fields become that subcommand's arguments
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the built-in golang.org link graph
    ///
    /// Example: link-crawler demo --max-depth 2
    Demo {
        /// Seed URL inside the built-in graph
        ///
        /// Positional, but optional thanks to the default value
        #[arg(default_value = "https://golang.org/")]
        seed: String,

        /// Milliseconds every simulated fetch waits before answering
        ///
        /// Makes tasks overlap the way real network requests would.
        /// 0 = answer immediately.
        #[arg(long, env = "CRAWL_DEMO_LATENCY_MS", default_value_t = 0)]
        latency_ms: u64,

        // Pulls in every flag from CrawlOptions as if written here
        #[command(flatten)]
        options: CrawlOptions,
    },

    /// Crawl a real website (same domain only)
    ///
    /// Example: link-crawler site https://example.com --max-depth 2
    Site {
        /// Website URL to start from (e.g., https://example.com)
        website_url: String,

        #[command(flatten)]
        options: CrawlOptions,
    },
}

// Flags shared by both subcommands
//
// #[derive(Args)] (instead of Parser) marks this as a group that gets
// flattened into other commands
#[derive(Args, Debug, Clone)]
pub struct CrawlOptions {
    /// Maximum crawl depth (1 = just the seed page)
    ///
    /// --max-depth flag, or CRAWL_MAX_DEPTH, or 4
    #[arg(long, env = "CRAWL_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// How strictly duplicate URLs are avoided
    ///
    /// value_enum makes clap accept the enum's variant names: strict, best-effort
    #[arg(long, env = "CRAWL_DEDUP", value_enum, default_value_t = DedupPolicy::Strict)]
    pub dedup: DedupPolicy,

    /// Maximum number of pages fetched at the same time (unlimited if unset)
    ///
    /// Option<usize> = the flag is optional and has no default
    #[arg(long, env = "CRAWL_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,

    /// Output the report as JSON instead of live text
    #[arg(long)]
    pub json: bool,
}

impl CrawlOptions {
    // Turns the parsed flags into the crawler's config
    pub fn crawl_config(&self) -> CrawlConfig {
        let config = CrawlConfig::new(self.max_depth).with_dedup(self.dedup);
        match self.max_concurrency {
            Some(limit) => config.with_max_concurrency(limit),
            None => config,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It copies the fields of another Args struct into this command
//    - `demo --max-depth 2` and `site URL --max-depth 2` both work,
//      but the flags are only declared once
//
// 2. How does `env = "..."` work?
//    - If the flag isn't given, clap reads the environment variable
//    - If neither is set, the default value is used
//    - Order: command line > environment > default
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-wide; tests that touch them take turns
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const CRAWL_VARS: [&str; 4] = [
        "CRAWL_MAX_DEPTH",
        "CRAWL_DEDUP",
        "CRAWL_MAX_CONCURRENCY",
        "CRAWL_DEMO_LATENCY_MS",
    ];

    fn clear_crawl_vars() {
        for var in CRAWL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_demo_defaults() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_crawl_vars();

        let cli = Cli::try_parse_from(["link-crawler", "demo"]).unwrap();
        let Commands::Demo { seed, latency_ms, options } = cli.command else {
            panic!("expected demo command");
        };
        assert_eq!(seed, "https://golang.org/");
        assert_eq!(latency_ms, 0);
        assert_eq!(options.crawl_config(), CrawlConfig::default());
        assert!(!options.json);
    }

    #[test]
    fn test_environment_fills_in_missing_flags() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_crawl_vars();
        std::env::set_var("CRAWL_MAX_DEPTH", "7");
        std::env::set_var("CRAWL_DEDUP", "best-effort");
        std::env::set_var("CRAWL_DEMO_LATENCY_MS", "25");

        let parsed = Cli::try_parse_from(["link-crawler", "demo", "--max-depth", "3"]);
        clear_crawl_vars();

        let Commands::Demo { latency_ms, options, .. } = parsed.unwrap().command else {
            panic!("expected demo command");
        };
        // The flag beats the environment; the rest come from the environment
        assert_eq!(
            options.crawl_config(),
            CrawlConfig::new(3).with_dedup(DedupPolicy::BestEffort)
        );
        assert_eq!(latency_ms, 25);
    }

    #[test]
    fn test_site_options_map_to_config() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_crawl_vars();

        let cli = Cli::try_parse_from([
            "link-crawler",
            "site",
            "https://example.com",
            "--max-depth",
            "2",
            "--dedup",
            "best-effort",
            "--max-concurrency",
            "8",
            "--json",
        ])
        .unwrap();
        let Commands::Site { website_url, options } = cli.command else {
            panic!("expected site command");
        };
        assert_eq!(website_url, "https://example.com");
        assert_eq!(
            options.crawl_config(),
            CrawlConfig::new(2)
                .with_dedup(DedupPolicy::BestEffort)
                .with_max_concurrency(8)
        );
        assert!(options.json);
    }
}
