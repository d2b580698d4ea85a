//! Bounded, self-feeding fetch worker pool
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Fetch, extract and log for each target
//! - Retrying failed fetches according to a [`RetryPolicy`]
//! - Feeding one new target from the dispatcher per crawled target
//! - Detecting drain (nothing queued, nothing in flight)

use crate::config::FetchConfig;
use crate::crawler::dispatcher::{Dispatch, IdDispatcher, Target};
use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::monitor::RateMonitor;
use crate::output::CrawlSinks;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// How failed fetches are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt; `None` retries forever
    pub max_retries: Option<u32>,

    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Retry immediately, forever
    pub fn unbounded() -> Self {
        Self {
            max_retries: None,
            delay: Duration::ZERO,
        }
    }

    pub fn bounded(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries: Some(max_retries),
            delay,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Whether another attempt follows `failed_attempts` failures
    pub fn should_retry(&self, failed_attempts: u32) -> bool {
        self.max_retries.map_or(true, |max| failed_attempts <= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Counters for one pool run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub completed: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl PoolStats {
    fn record(&mut self, result: &FetchResult) {
        self.completed += 1;
        if result.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Everything a worker task needs, shared between tasks
struct Worker {
    fetcher: Arc<dyn PageFetcher>,
    dispatcher: Arc<IdDispatcher>,
    monitor: Arc<RateMonitor>,
    sinks: CrawlSinks,
    base_url: String,
    url_suffix: String,
    retry: RetryPolicy,
}

impl Worker {
    /// Crawls one target to its final outcome
    ///
    /// The first attempt to get a response, good or bad, pulls exactly one
    /// new target from the dispatcher. Retries never do.
    async fn process(&self, target: Target, feed: UnboundedSender<Target>) -> FetchResult {
        let url = target.url(&self.base_url, &self.url_suffix);
        let mut failed_attempts: u32 = 0;
        let mut feeder = FeedOnce {
            worker: self,
            feed,
            target,
            fed: false,
        };

        let result = loop {
            let outcome = self.fetcher.fetch(&url).await;
            feeder.feed();

            match outcome {
                Ok(fields) => break FetchResult::success(target.id, fields),
                Err(e) => {
                    failed_attempts += 1;
                    tracing::debug!("Fetch {} failed (attempt {}): {}", url, failed_attempts, e);
                    self.sinks.errors.log_error(&url, &e);

                    if !self.retry.should_retry(failed_attempts) {
                        tracing::warn!(
                            "Giving up on {} after {} attempts",
                            url,
                            failed_attempts
                        );
                        break FetchResult::failure(target.id);
                    }

                    if self.retry.delay.is_zero() {
                        // Let other targets run between immediate retries
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(self.retry.delay).await;
                    }
                }
            }
        };

        self.sinks.results.log_result(&result);
        if let Some(report) = self.monitor.observe(target.id) {
            self.sinks.reports.log_report(&report);
        }

        result
    }

    fn feed_next(&self, feed: &UnboundedSender<Target>) {
        match self.dispatcher.next() {
            Dispatch::Target(next) => {
                if feed.send(next).is_err() {
                    tracing::error!("Pool stopped before target {} could be queued", next);
                }
            }
            Dispatch::Exhausted => {
                tracing::trace!("Dispatcher exhausted, nothing to feed");
            }
        }
    }
}

/// Pulls a target's one successor from the dispatcher
///
/// If the task is dropped before its first response (a panicking fetch, for
/// instance) the successor is still pulled on drop, so the chain of targets
/// that feed each other is never cut short.
struct FeedOnce<'a> {
    worker: &'a Worker,
    feed: UnboundedSender<Target>,
    target: Target,
    fed: bool,
}

impl FeedOnce<'_> {
    fn feed(&mut self) {
        if !self.fed {
            self.fed = true;
            self.worker.feed_next(&self.feed);
        }
    }
}

impl Drop for FeedOnce<'_> {
    fn drop(&mut self) {
        if !self.fed {
            tracing::warn!("Target {} ended without a response", self.target);
            self.feed();
        }
    }
}

/// Settings for a [`FetchWorkerPool`]
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum number of targets in flight
    pub thread_count: usize,
    pub base_url: String,
    pub url_suffix: String,
    pub retry: RetryPolicy,
}

/// Runs targets with bounded parallelism until the pool drains
pub struct FetchWorkerPool {
    worker: Arc<Worker>,

    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,
}

impl FetchWorkerPool {
    pub fn new(
        settings: PoolSettings,
        fetcher: Arc<dyn PageFetcher>,
        dispatcher: Arc<IdDispatcher>,
        monitor: Arc<RateMonitor>,
        sinks: CrawlSinks,
    ) -> Self {
        let worker = Worker {
            fetcher,
            dispatcher,
            monitor,
            sinks,
            base_url: settings.base_url,
            url_suffix: settings.url_suffix,
            retry: settings.retry,
        };

        Self {
            worker: Arc::new(worker),
            semaphore: Arc::new(Semaphore::new(settings.thread_count.max(1))),
        }
    }

    /// Crawls the seed targets and everything they feed, then returns
    ///
    /// The pool is drained when no target is queued and none is in flight.
    /// Under an unbounded retry policy a target that never succeeds keeps
    /// the pool from draining.
    pub async fn run(&self, seeds: Vec<Target>) -> PoolStats {
        let (feed_tx, mut feed_rx) = mpsc::unbounded_channel::<Target>();
        let mut queue: VecDeque<Target> = seeds.into();
        let mut tasks: JoinSet<FetchResult> = JoinSet::new();
        let mut stats = PoolStats::default();

        loop {
            while let Ok(target) = feed_rx.try_recv() {
                queue.push_back(target);
            }

            // Admit queued targets while permits are available
            while let Some(target) = queue.pop_front() {
                let permit = match Arc::clone(&self.semaphore).try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        queue.push_front(target);
                        break;
                    }
                };
                let worker = Arc::clone(&self.worker);
                let feed = feed_tx.clone();
                tasks.spawn(async move {
                    let _permit = permit;
                    worker.process(target, feed).await
                });
            }

            // Feeds are sent before a task finishes and finished tasks are
            // only removed by join_next below, so an empty set here means
            // every feed has already been drained into the queue.
            if tasks.is_empty() && queue.is_empty() {
                break;
            }

            tokio::select! {
                Some(target) = feed_rx.recv() => queue.push_back(target),
                Some(joined) = tasks.join_next() => match joined {
                    Ok(result) => stats.record(&result),
                    Err(e) => {
                        tracing::error!("Fetch task failed: {}", e);
                        stats.completed += 1;
                        stats.failed += 1;
                    }
                },
            }
        }

        tracing::debug!(
            "Pool drained: {} completed, {} failed",
            stats.completed,
            stats.failed
        );
        stats
    }
}
