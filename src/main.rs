//! Range-Crawler main entry point
//!
//! This is the command-line interface for the Range-Crawler id crawler.

use anyhow::Context;
use clap::Parser;
use range_crawler::config::{load_config_with_hash, Config};
use range_crawler::crawler::{crawl, Target, SEED_FACTOR};
use range_crawler::output::print_summary;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Range-Crawler: a bounded-range id crawler
///
/// Range-Crawler fetches one page per id in [begin-id, end-id), extracts an
/// owner and a title from it and logs the results. The end-id can be edited
/// in the config file while the crawl runs.
#[derive(Parser, Debug)]
#[command(name = "range-crawler")]
#[command(version)]
#[command(about = "A bounded-range id crawler", long_about = None)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG", default_value = "conf.yaml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // A config that does not load is fatal
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config, &cli.config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("range_crawler=info,warn"),
            1 => EnvFilter::new("range_crawler=debug,info"),
            2 => EnvFilter::new("range_crawler=trace,debug"),
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
fn handle_dry_run(config: &Config) {
    println!("=== Range-Crawler Dry Run ===\n");

    println!("Crawl:");
    println!("  Id range: [{}, {})", config.begin_id, config.end_id);
    println!("  Targets: {}", config.end_id - config.begin_id);
    println!("  Thread count: {}", config.thread_count);
    println!(
        "  Seed attempts: {}",
        config.thread_count as usize * SEED_FACTOR
    );
    println!("  Report every: {} completions", config.monitor_count);

    println!("\nTarget:");
    let first = Target {
        id: config.begin_id,
    };
    println!(
        "  First URL: {}",
        first.url(&config.target.base_url, &config.target.url_suffix)
    );
    println!(
        "  Owner: {} @{}",
        config.target.owner_selector, config.target.owner_attr
    );
    println!(
        "  Title: {} @{}",
        config.target.title_selector, config.target.title_attr
    );

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    match config.fetch.max_retries {
        Some(max) => println!(
            "  Retries: up to {} ({}ms apart)",
            max, config.fetch.retry_delay_ms
        ),
        None => println!("  Retries: unlimited ({}ms apart)", config.fetch.retry_delay_ms),
    }

    println!("\nOutput:");
    println!("  Log directory: {}", config.log_dir);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_path: &Path, config_hash: String) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling [{}, {}) with {} workers",
        config.begin_id,
        config.end_id,
        config.thread_count
    );

    match crawl(config, config_path, config_hash).await {
        Ok(summary) => {
            tracing::info!("Crawl completed successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
