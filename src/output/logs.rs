//! Append-only crawl log files
//!
//! Three files live under the configured log directory:
//!
//! | File | Content |
//! |------|---------|
//! | `responsed.log` | `<id> <owner> <title>` per completed target |
//! | `error.log` | `HH:MM:SS <url> <error>` per failed attempt |
//! | `monitor.log` | `HH:MM:SS <report>` per throughput report, also printed |

use crate::crawler::{FetchResult, RateReport};
use crate::output::traits::{ErrorLogger, MonitorLogger, ResultLogger};
use crate::{CrawlerError, FetchError};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const RESULT_LOG: &str = "responsed.log";
pub const ERROR_LOG: &str = "error.log";
pub const MONITOR_LOG: &str = "monitor.log";

/// One append-only log file
struct LogFile {
    path: PathBuf,
    writer: Mutex<LineWriter<File>>,
}

impl LogFile {
    fn open(path: PathBuf) -> Result<Self, CrawlerError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| CrawlerError::LogSetup {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(LineWriter::new(file)),
        })
    }

    fn write_line(&self, line: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(writer, "{}", line) {
            tracing::warn!("Failed to write to {}: {}", self.path.display(), e);
        }
    }
}

/// File-backed result, error and monitor logs
pub struct FileLogs {
    dir: PathBuf,
    results: LogFile,
    errors: LogFile,
    monitor: LogFile,
}

impl FileLogs {
    /// Creates the log directory if needed and opens the three log files
    ///
    /// # Returns
    ///
    /// * `Ok(FileLogs)` - All files opened for appending
    /// * `Err(CrawlerError::LogSetup)` - Directory or file could not be created
    pub fn open(dir: &Path) -> Result<Self, CrawlerError> {
        std::fs::create_dir_all(dir).map_err(|source| CrawlerError::LogSetup {
            path: dir.display().to_string(),
            source,
        })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            results: LogFile::open(dir.join(RESULT_LOG))?,
            errors: LogFile::open(dir.join(ERROR_LOG))?,
            monitor: LogFile::open(dir.join(MONITOR_LOG))?,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

impl ResultLogger for FileLogs {
    fn log_result(&self, result: &FetchResult) {
        self.results.write_line(&result.to_string());
    }
}

impl ErrorLogger for FileLogs {
    fn log_error(&self, url: &str, error: &FetchError) {
        self.errors
            .write_line(&format!("{} {} {}", timestamp(), url, error));
    }
}

impl MonitorLogger for FileLogs {
    fn log_report(&self, report: &RateReport) {
        tracing::info!("{}", report);
        self.monitor.write_line(&format!("{} {}", timestamp(), report));
    }
}
