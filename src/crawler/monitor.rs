//! Throughput monitor
//!
//! Counts completed targets and, every `monitor_count` completions, produces
//! a [`RateReport`] with the elapsed time, the running total, the id that
//! triggered the report and the throughput since the previous report.

use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Floor for the throughput denominator
const MIN_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// A periodic throughput report
#[derive(Debug, Clone, PartialEq)]
pub struct RateReport {
    /// Wall-clock time since the monitor started
    pub elapsed: Duration,

    /// Completions observed so far
    pub total: u64,

    /// Id of the completion that triggered this report
    pub last_id: i64,

    /// Completions per second since the previous report
    pub throughput: f64,
}

impl RateReport {
    /// Formats the elapsed time as `HH:MM:SS`
    pub fn elapsed_hms(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    }
}

impl fmt::Display for RateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tps:{:.0}\ttime:{}\tcount:{}\tid:{}",
            self.throughput,
            self.elapsed_hms(),
            self.total,
            self.last_id
        )
    }
}

/// Reporting window state, guarded by the monitor lock
#[derive(Debug)]
struct RateWindow {
    event_count: u64,
    window_start: Instant,
    last_report_time: Instant,
}

/// Count-based throughput monitor
#[derive(Debug)]
pub struct RateMonitor {
    monitor_count: u64,
    window: Mutex<RateWindow>,
}

impl RateMonitor {
    /// Creates a monitor reporting every `monitor_count` observations
    ///
    /// A `monitor_count` of zero is treated as one.
    pub fn new(monitor_count: u64) -> Self {
        Self::starting_at(monitor_count, Instant::now())
    }

    fn starting_at(monitor_count: u64, start: Instant) -> Self {
        Self {
            monitor_count: monitor_count.max(1),
            window: Mutex::new(RateWindow {
                event_count: 0,
                window_start: start,
                last_report_time: start,
            }),
        }
    }

    /// Records one completed target
    ///
    /// Returns a report when this observation crosses a multiple of
    /// `monitor_count`.
    pub fn observe(&self, id: i64) -> Option<RateReport> {
        self.observe_at(id, Instant::now())
    }

    fn observe_at(&self, id: i64, now: Instant) -> Option<RateReport> {
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        window.event_count += 1;
        if window.event_count % self.monitor_count != 0 {
            return None;
        }

        let since_last = now
            .saturating_duration_since(window.last_report_time)
            .max(MIN_REPORT_INTERVAL);
        let report = RateReport {
            elapsed: now.saturating_duration_since(window.window_start),
            total: window.event_count,
            last_id: id,
            throughput: self.monitor_count as f64 / since_last.as_secs_f64(),
        };
        window.last_report_time = now;

        Some(report)
    }

    /// Completions observed so far
    pub fn total(&self) -> u64 {
        self.window
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .event_count
    }

    pub fn monitor_count(&self) -> u64 {
        self.monitor_count
    }
}
