//! Live reload of the crawl upper bound
//!
//! The watcher polls the configuration file, and whenever its content hash
//! changes it re-parses the file and publishes the new `end-id` through the
//! shared [`CrawlBound`]. Nothing else in the configuration is reloaded.

use crate::config::parser::{compute_config_hash, load_config};
use crate::crawler::CrawlBound;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Outcome of a single poll of the configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// File content is identical to the last seen version
    Unchanged,

    /// File changed and the new upper bound was published
    Reloaded { end_id: i64 },

    /// File could not be read or did not validate; the bound is untouched
    Failed,
}

/// Polls a configuration file and pushes `end-id` changes into a bound
pub struct ConfigWatcher {
    path: PathBuf,
    bound: CrawlBound,
    interval: Duration,
    last_hash: Option<String>,
}

impl ConfigWatcher {
    /// Creates a watcher
    ///
    /// `initial_hash` is the hash of the content the crawl was started with,
    /// so that the first poll does not count as a change.
    pub fn new(
        path: impl Into<PathBuf>,
        bound: CrawlBound,
        interval: Duration,
        initial_hash: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            bound,
            interval,
            last_hash: initial_hash,
        }
    }

    /// Checks the file once and applies a changed `end-id`
    pub fn poll(&mut self) -> ReloadOutcome {
        let hash = match compute_config_hash(&self.path) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!("Cannot read config {}: {}", self.path.display(), e);
                return ReloadOutcome::Failed;
            }
        };

        if self.last_hash.as_deref() == Some(hash.as_str()) {
            return ReloadOutcome::Unchanged;
        }

        // Remember the hash even on failure so a broken file is reported once
        self.last_hash = Some(hash);

        match load_config(&self.path) {
            Ok(config) => {
                let previous = self.bound.set(config.end_id);
                tracing::info!(
                    "Config changed: {}, end_id {} -> {}",
                    self.path.display(),
                    previous,
                    config.end_id
                );
                ReloadOutcome::Reloaded {
                    end_id: config.end_id,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring invalid config change in {}: {}",
                    self.path.display(),
                    e
                );
                ReloadOutcome::Failed
            }
        }
    }

    /// Runs the polling loop on the tokio runtime until the task is aborted
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.poll();
            }
        })
    }
}
