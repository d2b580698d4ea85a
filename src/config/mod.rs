//! Configuration module for Range-Crawler
//!
//! This module handles loading, parsing, and validating YAML configuration
//! files, and watching them for changes to the crawl upper bound.
//!
//! # Example
//!
//! ```no_run
//! use range_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("conf.yaml")).unwrap();
//! println!("Crawling [{}, {})", config.begin_id, config.end_id);
//! ```

mod parser;
mod types;
mod validation;
mod watch;

// Re-export types
pub use types::{Config, FetchConfig, TargetConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use watch::{ConfigWatcher, ReloadOutcome};
