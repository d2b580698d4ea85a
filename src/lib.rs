//! Range-Crawler: a bounded-range id crawler
//!
//! This crate walks a numeric id space, fetches one page per id, extracts an
//! owner and a title from each page and logs the results while reporting its
//! own throughput.

pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for Range-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Log setup error for {path}: {source}")]
    LogSetup {
        path: String,
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Errors raised by a single fetch attempt
///
/// Every variant is treated as recoverable by the worker pool and goes
/// through the retry policy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Range-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlBound, CrawlController, CrawlSummary, Dispatch, IdDispatcher, Target};
