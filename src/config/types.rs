use serde::Deserialize;

/// Main configuration structure for Range-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Maximum number of concurrent page fetches
    #[serde(rename = "thread-count")]
    pub thread_count: u32,

    /// Number of completed fetches between two throughput reports
    #[serde(rename = "monitor-count")]
    pub monitor_count: u64,

    /// First id to crawl (inclusive)
    #[serde(rename = "begin-id")]
    pub begin_id: i64,

    /// Upper bound of the id range (exclusive). Reloaded while crawling.
    #[serde(rename = "end-id")]
    pub end_id: i64,

    /// Directory holding the result, error and monitor logs
    #[serde(rename = "log-dir", default = "default_log_dir")]
    pub log_dir: String,

    pub target: TargetConfig,

    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Where pages live and which fields are extracted from them
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// URL prefix the id is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// URL suffix appended after the id
    #[serde(rename = "url-suffix", default)]
    pub url_suffix: String,

    /// CSS selector of the element carrying the owner
    #[serde(rename = "owner-selector")]
    pub owner_selector: String,

    /// Attribute of the owner element holding the value
    #[serde(rename = "owner-attr", default = "default_attr")]
    pub owner_attr: String,

    /// CSS selector of the element carrying the title
    #[serde(rename = "title-selector")]
    pub title_selector: String,

    /// Attribute of the title element holding the value
    #[serde(rename = "title-attr", default = "default_attr")]
    pub title_attr: String,
}

/// HTTP and retry behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt; absent means retry forever
    #[serde(rename = "max-retries", default)]
    pub max_retries: Option<u32>,

    /// Pause between two attempts of the same target (milliseconds)
    #[serde(rename = "retry-delay-ms", default)]
    pub retry_delay_ms: u64,

    /// How often the config file is checked for changes (seconds)
    #[serde(rename = "reload-interval-secs", default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: None,
            retry_delay_ms: 0,
            reload_interval_secs: default_reload_interval_secs(),
        }
    }
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

fn default_attr() -> String {
    "title".to_string()
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_reload_interval_secs() -> u64 {
    2
}
