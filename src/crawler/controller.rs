//! Crawl controller - lifecycle of one crawl
//!
//! The controller wires the dispatcher, monitor and worker pool together,
//! seeds the first batch of targets and waits for the pool to drain.

use crate::config::Config;
use crate::crawler::dispatcher::{CrawlBound, IdDispatcher, Target};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::monitor::RateMonitor;
use crate::crawler::pool::{FetchWorkerPool, PoolSettings, RetryPolicy};
use crate::output::{CrawlSinks, CrawlSummary};
use crate::CrawlerError;
use std::sync::Arc;
use std::time::Instant;

/// Seed dispatch attempts per unit of concurrency
pub const SEED_FACTOR: usize = 10;

/// Main crawl controller structure
pub struct CrawlController {
    dispatcher: Arc<IdDispatcher>,
    pool: FetchWorkerPool,
    thread_count: usize,
}

impl CrawlController {
    /// Creates a controller around an arbitrary fetcher
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `bound` - Live upper bound, initialised from `config.end_id` by the caller
    /// * `fetcher` - Fetch capability used by the workers
    /// * `sinks` - Where results, errors and reports go
    pub fn new(
        config: &Config,
        bound: CrawlBound,
        fetcher: Arc<dyn PageFetcher>,
        sinks: CrawlSinks,
    ) -> Self {
        let thread_count = config.thread_count.max(1) as usize;
        let dispatcher = Arc::new(IdDispatcher::new(config.begin_id, bound));
        let monitor = Arc::new(RateMonitor::new(config.monitor_count));

        let settings = PoolSettings {
            thread_count,
            base_url: config.target.base_url.clone(),
            url_suffix: config.target.url_suffix.clone(),
            retry: RetryPolicy::from_config(&config.fetch),
        };
        let pool = FetchWorkerPool::new(
            settings,
            fetcher,
            Arc::clone(&dispatcher),
            monitor,
            sinks,
        );

        Self {
            dispatcher,
            pool,
            thread_count,
        }
    }

    /// Creates a controller fetching over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlController)` - Client built and selectors compiled
    /// * `Err(CrawlerError)` - Failed to build the HTTP client or a selector
    pub fn with_http(
        config: &Config,
        bound: CrawlBound,
        sinks: CrawlSinks,
    ) -> Result<Self, CrawlerError> {
        let fetcher = HttpFetcher::from_config(&config.target, &config.fetch)?;
        Ok(Self::new(config, bound, Arc::new(fetcher), sinks))
    }

    /// Number of dispatch attempts made while seeding
    pub fn seed_attempts(&self) -> usize {
        self.thread_count * SEED_FACTOR
    }

    /// Pulls the initial batch of targets from the dispatcher
    ///
    /// Attempts that hit an exhausted range produce nothing.
    fn seed(&self) -> Vec<Target> {
        (0..self.seed_attempts())
            .filter_map(|_| self.dispatcher.next().target())
            .collect()
    }

    /// Runs the crawl until the pool drains
    pub async fn run(&self) -> CrawlSummary {
        let start = Instant::now();

        let seeds = self.seed();
        let seeded = seeds.len() as u64;
        tracing::info!(
            "Seeded {} targets from {} attempts (end_id {})",
            seeded,
            self.seed_attempts(),
            self.dispatcher.bound().get()
        );

        let stats = self.pool.run(seeds).await;

        let summary = CrawlSummary {
            seed_attempts: self.seed_attempts() as u64,
            seeded,
            issued: self.dispatcher.issued(),
            completed: stats.completed,
            succeeded: stats.succeeded,
            failed: stats.failed,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Crawl drained: {} completed ({} failed) in {:?}",
            summary.completed,
            summary.failed,
            summary.elapsed
        );

        summary
    }
}
