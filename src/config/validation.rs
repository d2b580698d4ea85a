use crate::config::types::{Config, FetchConfig, TargetConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_settings(config)?;
    validate_target_config(&config.target)?;
    validate_fetch_config(&config.fetch)?;
    Ok(())
}

/// Validates concurrency, reporting cadence and the id range
fn validate_crawl_settings(config: &Config) -> Result<(), ConfigError> {
    if config.thread_count < 1 || config.thread_count > 1000 {
        return Err(ConfigError::Validation(format!(
            "thread_count must be between 1 and 1000, got {}",
            config.thread_count
        )));
    }

    if config.monitor_count < 1 {
        return Err(ConfigError::Validation(format!(
            "monitor_count must be >= 1, got {}",
            config.monitor_count
        )));
    }

    // The cursor starts at begin - 1, so begin must leave room below it
    if config.begin_id < 1 {
        return Err(ConfigError::Validation(format!(
            "begin_id must be >= 1, got {}",
            config.begin_id
        )));
    }

    if config.begin_id > config.end_id {
        return Err(ConfigError::Validation(format!(
            "begin_id ({}) must not exceed end_id ({})",
            config.begin_id, config.end_id
        )));
    }

    if config.log_dir.is_empty() {
        return Err(ConfigError::Validation(
            "log_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the target URL template and field selectors
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    validate_selector(&config.owner_selector)?;
    validate_selector(&config.title_selector)?;

    if config.owner_attr.is_empty() || config.title_attr.is_empty() {
        return Err(ConfigError::Validation(
            "owner_attr and title_attr cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.reload_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "reload_interval_secs must be >= 1, got {}",
            config.reload_interval_secs
        )));
    }

    Ok(())
}

/// Checks that a CSS selector parses
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(
            "selector cannot be empty".to_string(),
        ));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}
