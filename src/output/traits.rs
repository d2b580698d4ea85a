//! Output handler traits
//!
//! The worker pool reports every event through these traits. Implementations
//! are append-only and must not fail the crawl: write problems are theirs to
//! log.

use crate::crawler::{FetchResult, RateReport};
use crate::FetchError;
use std::sync::Arc;

/// Receives one result per completed target
pub trait ResultLogger: Send + Sync {
    fn log_result(&self, result: &FetchResult);
}

/// Receives every failed fetch attempt, before it is retried
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, url: &str, error: &FetchError);
}

/// Receives periodic throughput reports
pub trait MonitorLogger: Send + Sync {
    fn log_report(&self, report: &RateReport);
}

/// The set of output handlers a crawl writes to
#[derive(Clone)]
pub struct CrawlSinks {
    pub results: Arc<dyn ResultLogger>,
    pub errors: Arc<dyn ErrorLogger>,
    pub reports: Arc<dyn MonitorLogger>,
}

impl CrawlSinks {
    /// Uses one handler for all three streams
    pub fn shared<T>(handler: Arc<T>) -> Self
    where
        T: ResultLogger + ErrorLogger + MonitorLogger + 'static,
    {
        Self {
            results: handler.clone(),
            errors: handler.clone(),
            reports: handler,
        }
    }
}

impl std::fmt::Debug for CrawlSinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CrawlSinks {{ /* omitted */ }}")
    }
}
