//! Id dispatcher for walking the crawl range
//!
//! The dispatcher owns the crawl cursor and hands out each id in
//! `[begin, end)` exactly once. The upper bound lives in a [`CrawlBound`]
//! that can be raised or lowered while the crawl runs.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// One unit of crawl work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    pub id: i64,
}

impl Target {
    /// Builds the page URL for this target: `base_url + id + suffix`
    pub fn url(&self, base_url: &str, suffix: &str) -> String {
        format!("{}{}{}", base_url, self.id, suffix)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Result of asking the dispatcher for work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The next id to crawl
    Target(Target),

    /// Every id below the current bound has been issued
    Exhausted,
}

impl Dispatch {
    /// Returns the target, if any
    pub fn target(self) -> Option<Target> {
        match self {
            Dispatch::Target(target) => Some(target),
            Dispatch::Exhausted => None,
        }
    }
}

/// Shared, live-updatable exclusive upper bound of the crawl range
///
/// Cloning yields another handle to the same bound.
#[derive(Debug, Clone)]
pub struct CrawlBound {
    end: Arc<AtomicI64>,
}

impl CrawlBound {
    pub fn new(end: i64) -> Self {
        Self {
            end: Arc::new(AtomicI64::new(end)),
        }
    }

    /// Current upper bound
    pub fn get(&self) -> i64 {
        self.end.load(Ordering::Acquire)
    }

    /// Publishes a new upper bound and returns the previous one
    pub fn set(&self, end: i64) -> i64 {
        self.end.swap(end, Ordering::AcqRel)
    }
}

/// Cursor state, only ever touched under the dispatcher lock
#[derive(Debug)]
struct CrawlCursor {
    /// Last id handed out (or `begin - 1` before the first call)
    current: i64,

    /// Number of real targets handed out
    issued: u64,
}

/// Hands out crawl targets from a monotonic cursor
#[derive(Debug)]
pub struct IdDispatcher {
    cursor: Mutex<CrawlCursor>,

    /// Upper bound, re-read on every call
    bound: CrawlBound,
}

impl IdDispatcher {
    /// Creates a dispatcher whose first target will be `begin`
    pub fn new(begin: i64, bound: CrawlBound) -> Self {
        Self {
            cursor: Mutex::new(CrawlCursor {
                current: begin - 1,
                issued: 0,
            }),
            bound,
        }
    }

    /// Advances the cursor and returns the next target
    ///
    /// Increment, compare and return happen under one lock, so each id is
    /// issued to exactly one caller. The cursor keeps advancing after the
    /// bound is reached; raising the bound later only yields ids above the
    /// cursor.
    pub fn next(&self) -> Dispatch {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        cursor.current += 1;
        if cursor.current < self.bound.get() {
            cursor.issued += 1;
            Dispatch::Target(Target { id: cursor.current })
        } else {
            Dispatch::Exhausted
        }
    }

    /// Number of real targets issued so far
    pub fn issued(&self) -> u64 {
        self.cursor.lock().unwrap_or_else(|e| e.into_inner()).issued
    }

    /// The shared bound this dispatcher reads
    pub fn bound(&self) -> &CrawlBound {
        &self.bound
    }
}
