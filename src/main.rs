//! Kite main entry point
//!
//! This is the command-line interface for the Kite site crawler.

use anyhow::Context;
use clap::Parser;
use kite_crawler::config::{load_config_with_hash, Config, CrawlConfig};
use kite_crawler::crawler::run_crawl_until;
use kite_crawler::output::{load_statistics, print_statistics, print_summary, write_records_json};
use kite_crawler::storage::{RecordSink, RunStatus, SqliteStorage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Kite: a polite, depth-bounded site crawler
///
/// Kite crawls a single site breadth-first while respecting robots.txt and a
/// courteous request interval, then stores the extracted page records.
#[derive(Parser, Debug)]
#[command(name = "kite-crawler")]
#[command(version)]
#[command(about = "A polite, depth-bounded site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Crawl without writing to the database
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    no_store: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash, cli.no_store).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kite_crawler=info,warn"),
            1 => EnvFilter::new("kite_crawler=debug,info"),
            2 => EnvFilter::new("kite_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let crawl = CrawlConfig::from_config(config)?;

    println!("=== Kite Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", crawl.base_url);
    println!("  Max depth: {}", crawl.max_depth);
    println!("  Delay: {}ms", crawl.delay.as_millis());
    println!("  Respect robots.txt: {}", crawl.respect_robots);
    println!("  Use sitemap: {}", crawl.use_sitemap);
    println!("  Same domain only: {}", crawl.restrict_to_domain);
    println!("  Request timeout: {}s", crawl.request_timeout.as_secs());
    match crawl.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }

    println!("\nUser Agent:");
    println!("  Header: {}", crawl.user_agent);
    println!("  Robots token: {}", crawl.robots_token());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(json_path) = &config.output.json_path {
        println!("  JSON export: {}", json_path);
    }

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    if config.crawler.seeds.is_empty() {
        println!("✓ Would start crawling from {}", crawl.base_url);
    } else {
        println!(
            "✓ Would start crawling with {} seed URLs",
            config.crawler.seeds.len()
        );
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str, no_store: bool) -> anyhow::Result<()> {
    let crawl = CrawlConfig::from_config(config)?;
    let base_url = crawl.base_url.to_string();

    // Open storage up front so a bad path fails before any fetching
    let mut storage = if no_store {
        None
    } else {
        Some(SqliteStorage::new(Path::new(&config.output.database_path))?)
    };

    let stop = Arc::new(AtomicBool::new(false));
    let signal_stop = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C; finishing current page and stopping");
            signal_stop.store(true, Ordering::SeqCst);
        }
    });

    let result = run_crawl_until(crawl, config.crawler.seeds.clone(), stop).await?;

    if let Some(storage) = storage.as_mut() {
        let status = if result.stats.cancelled {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };
        let run_id = storage.store_run(&base_url, config_hash, status, &result)?;
        tracing::info!("Saved run {} to {}", run_id, config.output.database_path);
    }

    if let Some(json_path) = &config.output.json_path {
        write_records_json(&result.records, Path::new(json_path))?;
    }

    print_summary(&result);
    Ok(())
}
