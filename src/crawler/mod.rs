//! Crawler module for id-range crawling
//!
//! This module contains the core crawling logic, including:
//! - Monotonic id dispatch with a live upper bound
//! - Bounded, self-feeding fetch workers with retry
//! - Throughput monitoring
//! - HTTP fetching and field extraction
//! - Overall crawl coordination

mod controller;
mod dispatcher;
mod fetcher;
mod monitor;
mod parser;
mod pool;

pub use controller::{CrawlController, SEED_FACTOR};
pub use dispatcher::{CrawlBound, Dispatch, IdDispatcher, Target};
pub use fetcher::{build_http_client, FetchResult, HttpFetcher, PageFetcher};
pub use monitor::{RateMonitor, RateReport};
pub use parser::{ExtractedFields, FieldExtractor};
pub use pool::{FetchWorkerPool, PoolSettings, PoolStats, RetryPolicy};

pub use crate::output::CrawlSummary;

use crate::config::{Config, ConfigWatcher};
use crate::output::{CrawlSinks, FileLogs};
use crate::CrawlerError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the result, error and monitor logs under `log_dir`
/// 2. Build the HTTP client and compile the field selectors
/// 3. Start watching the config file for `end-id` changes
/// 4. Seed, crawl and wait for the pool to drain
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_path` - File the configuration was loaded from
/// * `config_hash` - Hash of the loaded content, so the watcher only reacts to edits
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The pool drained
/// * `Err(CrawlerError)` - Setup failed before crawling
///
/// # Example
///
/// ```no_run
/// use range_crawler::config::load_config_with_hash;
/// use range_crawler::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let path = Path::new("conf.yaml");
/// let (config, hash) = load_config_with_hash(path)?;
/// let summary = crawl(config, path, hash).await?;
/// println!("{} pages", summary.completed);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: Config,
    config_path: &Path,
    config_hash: String,
) -> Result<CrawlSummary, CrawlerError> {
    let logs = Arc::new(FileLogs::open(Path::new(&config.log_dir))?);
    tracing::info!(
        "[{}, {}) -> {}",
        config.begin_id,
        config.end_id,
        logs.dir().display()
    );

    let bound = CrawlBound::new(config.end_id);
    let controller = CrawlController::with_http(&config, bound.clone(), CrawlSinks::shared(logs))?;

    let watcher = ConfigWatcher::new(
        config_path,
        bound,
        Duration::from_secs(config.fetch.reload_interval_secs),
        Some(config_hash),
    )
    .spawn();

    let summary = controller.run().await;
    watcher.abort();

    Ok(summary)
}
