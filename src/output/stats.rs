//! End-of-crawl statistics
//!
//! This module provides the summary returned by a finished crawl and a
//! printer for it.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlSummary {
    /// Dispatch attempts made while seeding
    pub seed_attempts: u64,

    /// Real targets obtained while seeding
    pub seeded: u64,

    /// Targets issued by the dispatcher over the whole crawl
    pub issued: u64,

    /// Targets that reached a final outcome
    pub completed: u64,

    /// Targets fetched successfully
    pub succeeded: u64,

    /// Targets given up on, or whose worker task panicked
    pub failed: u64,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Average completions per second over the whole crawl
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.completed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Seeding:");
    println!(
        "  {} targets from {} dispatch attempts",
        summary.seeded, summary.seed_attempts
    );
    println!();

    println!("Targets:");
    println!("  Issued: {}", summary.issued);
    println!("  Completed: {}", summary.completed);
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed);
    println!();

    println!(
        "Elapsed: {:.1}s ({:.2} targets/sec)",
        summary.elapsed.as_secs_f64(),
        summary.rate()
    );
}
