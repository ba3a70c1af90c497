//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use hydra::config::CrawlConfig;
use hydra::crawler::{crawl, Coordinator};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast-polling test configuration logging into `log_dir`
fn create_test_config(workers: usize, log_dir: &Path) -> CrawlConfig {
    CrawlConfig {
        max_workers: workers,
        monitor_interval_ms: 20,
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
        log_dir: log_dir.to_path_buf(),
        ..CrawlConfig::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

fn read_log(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read run log")
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_single_page_without_links_drains() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());
    let body = "<html><body><p>nothing to see</p></body></html>";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let outcome = crawl(create_test_config(1, dir.path()), &seed, false)
        .await
        .expect("Crawl failed");

    assert!(outcome.is_success());
    assert_eq!(outcome.dequeued, 1);
    assert_eq!(outcome.stats.passed, 1);
    assert_eq!(outcome.stats.total_bytes, body.len() as u64);

    let log = read_log(&outcome.log_path);
    assert_eq!(log.len(), 1);
    assert!(log[0].starts_with(&format!("[200:{}:", body.len())));
    assert!(log[0].ends_with(&format!("] {}", seed)));
}

#[tokio::test]
async fn test_drain_is_detected_within_one_interval() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>no links</p>"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = CrawlConfig {
        monitor_interval_ms: 1000,
        ..create_test_config(1, dir.path())
    };

    let start = Instant::now();
    let outcome = crawl(config, &seed, false).await.expect("Crawl failed");
    let elapsed = start.elapsed();

    assert!(outcome.is_success());
    assert_eq!(outcome.dequeued, 1);
    assert!(
        elapsed < Duration::from_millis(2100),
        "drain took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_redirect_target_is_logged_and_used_as_base() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/start", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/real/"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/real/"))
        .respond_with(html(r#"<a href="leaf">leaf</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/real/leaf"))
        .respond_with(html("<p>leaf</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let outcome = crawl(create_test_config(2, dir.path()), &seed, false)
        .await
        .expect("Crawl failed");

    assert!(outcome.is_success());
    assert_eq!(outcome.dequeued, 2);
    assert_eq!(outcome.stats.passed, 2);

    let log = read_log(&outcome.log_path);
    let real = format!("{}/real/", mock_server.uri());
    let leaf = format!("{}/real/leaf", mock_server.uri());
    assert!(log.iter().any(|line| line.ends_with(&format!("] {}", real))));
    assert!(log.iter().any(|line| line.ends_with(&format!("] {}", leaf))));
    assert!(!log.iter().any(|line| line.ends_with("/start")));
}

#[tokio::test]
async fn test_bytes_are_counted_as_received() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());
    let body = b"opaque bytes labelled as gzip".to_vec();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.clone(), "application/octet-stream")
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let outcome = crawl(create_test_config(1, dir.path()), &seed, false)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.stats.passed, 1);
    assert_eq!(outcome.stats.total_bytes, body.len() as u64);
}

#[tokio::test]
async fn test_links_are_followed_once() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
            <a href="a/">A</a>
            <a href="b/">B</a>
            <a href="a/">A again</a>
            <a href=".">here</a>
            <!-- <a href="hidden/">commented out</a> -->
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/"))
        .respond_with(html(
            r#"<a href="x.html">x</a><a href="..">up</a><A HREF='x.html'>x</A>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b/"))
        .respond_with(html("<p>leaf</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/x.html"))
        .respond_with(html("<p>leaf</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden/"))
        .respond_with(html("<p>hidden</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let outcome = crawl(create_test_config(3, dir.path()), &seed, false)
        .await
        .expect("Crawl failed");

    assert!(outcome.is_success());
    assert_eq!(outcome.dequeued, 4);
    assert_eq!(outcome.stats.passed, 4);
    assert_eq!(outcome.stats.total(), outcome.dequeued);

    let mut logged: Vec<String> = read_log(&outcome.log_path)
        .iter()
        .map(|line| line.split_once("] ").unwrap().1.to_string())
        .collect();
    logged.sort();

    let mut expected = vec![
        seed.clone(),
        format!("{}a/", seed),
        format!("{}b/", seed),
        format!("{}a/x.html", seed),
    ];
    expected.sort();
    assert_eq!(logged, expected);

    // Wiremock verifies the expect() counts when the mock server drops
}

#[tokio::test]
async fn test_non_html_is_not_parsed() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"html": "<a href=\"x\">x</a>"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html("<p>never</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let outcome = crawl(create_test_config(2, dir.path()), &seed, false)
        .await
        .expect("Crawl failed");

    assert!(outcome.is_success());
    assert_eq!(outcome.dequeued, 1);
    assert_eq!(outcome.stats.passed, 1);
    assert_eq!(read_log(&outcome.log_path).len(), 1);
}

#[tokio::test]
async fn test_statuses_are_classified() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="missing">gone</a><a href="busy">busy</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let outcome = crawl(create_test_config(2, dir.path()), &seed, false)
        .await
        .expect("Crawl failed");

    assert!(outcome.is_success());
    assert_eq!(outcome.stats.passed, 1);
    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(outcome.stats.overloaded, 1);
    assert_eq!(outcome.stats.total(), outcome.dequeued);

    let log = read_log(&outcome.log_path);
    assert!(log
        .iter()
        .any(|line| line.starts_with("[404:") && line.ends_with("/missing")));
    assert!(log
        .iter()
        .any(|line| line.starts_with("[503:") && line.ends_with("/busy")));
}

#[tokio::test]
async fn test_timeout_counts_as_overloaded() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = CrawlConfig {
        request_timeout_secs: 1,
        ..create_test_config(1, dir.path())
    };
    let outcome = crawl(config, &seed, false).await.expect("Crawl failed");

    assert!(outcome.is_success());
    assert_eq!(outcome.stats.overloaded, 1);
    assert_eq!(outcome.stats.total_bytes, 0);

    let log = read_log(&outcome.log_path);
    assert_eq!(log.len(), 1);
    assert!(log[0].starts_with("[028:0:"));
    assert!(log[0].ends_with(&seed));
}

#[tokio::test]
async fn test_connection_failure_counts_as_failed() {
    let dir = tempfile::tempdir().unwrap();

    // Nothing listens on the discard port
    let outcome = crawl(create_test_config(1, dir.path()), "http://127.0.0.1:9/", false)
        .await
        .expect("Crawl failed");

    assert!(outcome.is_success());
    assert_eq!(outcome.stats.failed, 1);

    let log = read_log(&outcome.log_path);
    assert_eq!(log.len(), 1);
    assert!(log[0].starts_with("[000:0:"));
}

#[tokio::test]
async fn test_interrupt_lets_in_flight_fetch_finish() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html(r#"<a href="next">next</a>"#).set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("<p>too late</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let coordinator = Arc::new(
        Coordinator::new(create_test_config(2, dir.path())).expect("Failed to create coordinator"),
    );

    let outcome = coordinator
        .run_until(&seed, tokio::time::sleep(Duration::from_millis(100)))
        .await
        .expect("Crawl failed");

    assert!(outcome.interrupted);
    assert!(!outcome.is_success());
    assert_eq!(outcome.dequeued, 1);
    assert_eq!(outcome.stats.passed, 1);
    assert_eq!(coordinator.queued(), 0);

    // The in-flight fetch was waited for and logged
    let log = read_log(&outcome.log_path);
    assert_eq!(log.len(), 1);
    assert!(log[0].starts_with("[200:"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_wide_site_is_fully_crawled() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    let index: String = (0..30)
        .map(|i| format!(r#"<li><a href="p{}/">page {}</a></li>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!("<ul>{}</ul>", index)))
        .mount(&mock_server)
        .await;

    for i in 0..30 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}/", i)))
            .respond_with(html("<p>leaf</p>"))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let outcome = crawl(create_test_config(8, dir.path()), &seed, false)
        .await
        .expect("Crawl failed");

    assert!(outcome.is_success());
    assert_eq!(outcome.dequeued, 31);
    assert_eq!(outcome.stats.passed, 31);
    assert_eq!(read_log(&outcome.log_path).len(), 31);
}
