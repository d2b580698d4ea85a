//! Output module for crawl logs and summaries
//!
//! This module handles:
//! - The logger traits the worker pool reports through
//! - Append-only result, error and monitor log files
//! - The end-of-crawl summary

mod logs;
pub mod stats;
mod traits;

pub use logs::{FileLogs, ERROR_LOG, MONITOR_LOG, RESULT_LOG};
pub use stats::{print_summary, CrawlSummary};
pub use traits::{CrawlSinks, ErrorLogger, MonitorLogger, ResultLogger};
