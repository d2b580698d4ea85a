//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Fetching a page and extracting its fields
//! - Classifying failures so the worker pool can retry them

use crate::config::{FetchConfig, TargetConfig};
use crate::crawler::parser::{ExtractedFields, FieldExtractor};
use crate::{CrawlerError, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// Outcome of crawling one target, after all retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Id of the target this result belongs to
    pub id: i64,

    pub owner: String,

    pub title: String,

    /// False only when a bounded retry policy gave up on the target
    pub success: bool,
}

impl FetchResult {
    pub fn success(id: i64, fields: ExtractedFields) -> Self {
        Self {
            id,
            owner: fields.owner,
            title: fields.title,
            success: true,
        }
    }

    pub fn failure(id: i64) -> Self {
        Self {
            id,
            owner: String::new(),
            title: String::new(),
            success: false,
        }
    }
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(f, "{} {} {}", self.id, self.owner, self.title)
        } else {
            write!(f, "{} <failed>", self.id)
        }
    }
}

/// Something that can turn a URL into extracted page fields
///
/// Any error is considered transient and handed to the retry policy.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ExtractedFields, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP and extracts the owner and title
pub struct HttpFetcher {
    client: Client,
    extractor: FieldExtractor,
}

impl HttpFetcher {
    pub fn new(client: Client, extractor: FieldExtractor) -> Self {
        Self { client, extractor }
    }

    /// Builds the client and compiles the selectors from configuration
    pub fn from_config(target: &TargetConfig, fetch: &FetchConfig) -> Result<Self, CrawlerError> {
        let client = build_http_client(fetch)?;
        let extractor = FieldExtractor::new(target)?;
        Ok(Self::new(client, extractor))
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpFetcher {{ /* omitted */ }}")
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a page
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | fields extracted from the body |
    /// | any other status | `FetchError::Status` |
    /// | connect/timeout/body error | `FetchError::Transport` |
    async fn fetch(&self, url: &str) -> Result<ExtractedFields, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::trace!("{} -> {}", url, status);
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(self.extractor.extract(&body))
    }
}
