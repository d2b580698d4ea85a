//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from a config file on disk to the
//! log files it produces.

use range_crawler::config::load_config_with_hash;
use range_crawler::crawler::crawl;
use range_crawler::output::{ERROR_LOG, MONITOR_LOG, RESULT_LOG};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a config file into `dir` and returns its path
fn write_config(
    dir: &Path,
    base_url: &str,
    begin_id: i64,
    end_id: i64,
    thread_count: u32,
    extra_fetch: &str,
) -> PathBuf {
    let content = format!(
        r#"
thread-count: {thread_count}
monitor-count: 5
begin-id: {begin_id}
end-id: {end_id}
log-dir: "{log_dir}"
target:
  base-url: "{base_url}"
  url-suffix: ".html"
  owner-selector: "div.data__singer a.data__singer_txt"
  title-selector: "h1[class=data__name_txt]"
fetch:
  timeout-secs: 5
{extra_fetch}
"#,
        log_dir = dir.join("logs").display(),
    );
    let config_path = dir.join("conf.yaml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    config_path
}

fn page(owner: &str, title: &str) -> String {
    format!(
        r#"<html><body>
        <h1 class="data__name_txt" title="{title}">{title}</h1>
        <div class="data__singer"><a class="data__singer_txt js_user" title="{owner}">{owner}</a></div>
        </body></html>"#
    )
}

fn read_log(dir: &Path, name: &str) -> Vec<String> {
    std::fs::read_to_string(dir.join("logs").join(name))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn result_ids(lines: &[String]) -> Vec<i64> {
    let mut ids: Vec<i64> = lines
        .iter()
        .map(|line| line.split(' ').next().unwrap().parse().unwrap())
        .collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn test_full_crawl_writes_logs() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/playlist/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path_regex(r"^/playlist/\d+\.html$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("dj", "Mix")))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base_url, 1, 21, 3, "");
    let (config, hash) = load_config_with_hash(&config_path).unwrap();

    let summary = crawl(config, &config_path, hash).await.expect("Crawl failed");

    assert_eq!(summary.seed_attempts, 30);
    assert_eq!(summary.seeded, 20);
    assert_eq!(summary.completed, 20);
    assert_eq!(summary.succeeded, 20);

    let results = read_log(tmp.path(), RESULT_LOG);
    assert_eq!(result_ids(&results), (1..=20).collect::<Vec<_>>());
    assert!(results.iter().all(|line| line.ends_with(" dj Mix")));

    let reports = read_log(tmp.path(), MONITOR_LOG);
    assert_eq!(reports.len(), 4);
    assert!(reports.iter().any(|line| line.contains("count:20")));

    assert!(read_log(tmp.path(), ERROR_LOG).is_empty());
}

#[tokio::test]
async fn test_self_feeding_past_seed_batch() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/p/", mock_server.uri());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("o", "t")))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    // One worker seeds ten ids; the other ninety come from feeding
    let config_path = write_config(tmp.path(), &base_url, 500, 600, 1, "");
    let (config, hash) = load_config_with_hash(&config_path).unwrap();

    let summary = crawl(config, &config_path, hash).await.expect("Crawl failed");

    assert_eq!(summary.seeded, 10);
    assert_eq!(summary.completed, 100);
    assert_eq!(
        result_ids(&read_log(tmp.path(), RESULT_LOG)),
        (500..600).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_fields_extracted_per_page() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/p/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/p/1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("alice", "Morning")))
        .mount(&mock_server)
        .await;

    // A page without the expected markup still counts as crawled
    Mock::given(method("GET"))
        .and(path("/p/2.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>gone</body></html>"))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base_url, 1, 3, 2, "");
    let (config, hash) = load_config_with_hash(&config_path).unwrap();

    let summary = crawl(config, &config_path, hash).await.expect("Crawl failed");
    assert_eq!(summary.succeeded, 2);

    let mut results = read_log(tmp.path(), RESULT_LOG);
    results.sort();
    assert_eq!(results, vec!["1 alice Morning".to_string(), "2  ".to_string()]);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/p/", mock_server.uri());

    // First two requests for id 3 fail, later ones fall through to the page
    Mock::given(method("GET"))
        .and(path("/p/3.html"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("bob", "Late")))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), &base_url, 1, 6, 2, "");
    let (config, hash) = load_config_with_hash(&config_path).unwrap();

    let summary = crawl(config, &config_path, hash).await.expect("Crawl failed");

    assert_eq!(summary.completed, 5);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        result_ids(&read_log(tmp.path(), RESULT_LOG)),
        vec![1, 2, 3, 4, 5]
    );

    let errors = read_log(tmp.path(), ERROR_LOG);
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|line| line.contains("/p/3.html") && line.ends_with("HTTP status 500")));
}

#[tokio::test]
async fn test_bounded_retry_gives_up() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/p/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/p/2.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("o", "t")))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config_path = write_config(
        tmp.path(),
        &base_url,
        1,
        4,
        1,
        "  max-retries: 1\n  retry-delay-ms: 10",
    );
    let (config, hash) = load_config_with_hash(&config_path).unwrap();

    let summary = crawl(config, &config_path, hash).await.expect("Crawl failed");

    assert_eq!(summary.completed, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    let results = read_log(tmp.path(), RESULT_LOG);
    assert!(results.contains(&"2 <failed>".to_string()));
    assert_eq!(read_log(tmp.path(), ERROR_LOG).len(), 2);
}

#[tokio::test]
async fn test_unwritable_log_dir_fails_setup() {
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), "http://127.0.0.1:1/p/", 1, 2, 1, "");
    let (config, hash) = load_config_with_hash(&config_path).unwrap();

    // A regular file where the log directory should be
    std::fs::write(tmp.path().join("logs"), "not a directory").unwrap();

    let result = crawl(config, &config_path, hash).await;
    assert!(result.is_err());
}
