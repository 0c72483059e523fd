//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use search_crawler::config::{Config, DbConfig, LogicConfig, RestrictionsConfig};
use search_crawler::crawler::{now_epoch, run_crawl, Coordinator, ReqwestClient, VisitOutcome};
use search_crawler::storage::{open_storage, SqliteStorage, Storage};
use search_crawler::{FetchStatus, StopReason};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration scoped to the mock server's host
fn create_test_config(base_url: &str, db_path: &str) -> Config {
    let host = url::Url::parse(base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    Config {
        db: DbConfig {
            path: db_path.to_string(),
        },
        seeds: vec![format!("{}/", base_url)],
        logic: LogicConfig {
            delay: 0.0,
            timeout: 5,
            user_agent: "TestBot/1.0".to_string(),
            ..LogicConfig::default()
        },
        restrictions: RestrictionsConfig {
            allowed_domains: vec![host],
            disallowed_paths: vec![],
        },
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html; charset=utf-8")
}

fn coordinator_for(config: &Config) -> Coordinator<SqliteStorage, ReqwestClient> {
    let storage = SqliteStorage::new_in_memory().expect("Failed to open store");
    let client = ReqwestClient::from_config(&config.logic).expect("Failed to build client");
    Coordinator::new(config, storage, client, CancellationToken::new())
        .with_backoff_unit(Duration::ZERO)
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{0}/page1">Page 1</a>
            <a href="/report.pdf">Report</a>
            <a href="http://outside.invalid/page">Elsewhere</a>
            <a href="{0}/page1#comments">Page 1 again</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<html><head><title>Page 1</title></head><body><a href="/">Home</a></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(&base_url, db_path.to_str().unwrap());

    let (report, storage) = run_crawl(&config, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(report.stats.processed, 3);
    assert_eq!(report.stats.new, 2);
    assert_eq!(report.stats.not_html, 1);
    assert_eq!(report.stats.enqueued, 2);

    assert_eq!(storage.count().unwrap(), 3);
    let home = storage.find(&format!("{}/", base_url)).unwrap().unwrap();
    assert_eq!(home.title, "Home");
    assert_eq!(home.status, FetchStatus::Success);
    let page1 = storage
        .find(&format!("{}/page1", base_url))
        .unwrap()
        .unwrap();
    assert_eq!(page1.title, "Page 1");
    let report_pdf = storage
        .find(&format!("{}/report.pdf", base_url))
        .unwrap()
        .unwrap();
    assert_eq!(report_pdf.status, FetchStatus::NonHtml);
    assert!(report_pdf.raw_content.is_empty());
}

#[tokio::test]
async fn test_second_run_skips_fresh_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><title>Only</title></html>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(&base_url, db_path.to_str().unwrap());

    let (first, storage) = run_crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(first.stats.new, 1);
    drop(storage);

    let (second, storage) = run_crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(second.stats.processed, 1);
    assert_eq!(second.stats.skipped, 1);
    assert_eq!(storage.count().unwrap(), 1);

    let reopened = open_storage(db_path.to_str().unwrap()).unwrap();
    assert_eq!(reopened.count().unwrap(), 1);
}

#[tokio::test]
async fn test_revisit_with_unchanged_content() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><title>Stable</title></html>".to_string()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, ":memory:");
    let mut coordinator = coordinator_for(&config);
    let url = format!("{}/", base_url);

    let t0 = now_epoch();
    assert_eq!(coordinator.step_at(t0).await.unwrap(), Some(VisitOutcome::New));
    let stored = coordinator.storage().find(&url).unwrap().unwrap();

    let later = t0 + config.logic.revisit_interval + 1;
    assert_eq!(
        coordinator.step_at(later).await.unwrap(),
        Some(VisitOutcome::Unchanged)
    );

    let revisited = coordinator.storage().find(&url).unwrap().unwrap();
    assert_eq!(revisited.fetch_time, later);
    assert_eq!(revisited.next_fetch, later + config.logic.revisit_interval);
    assert_eq!(revisited.content_fingerprint, stored.content_fingerprint);
    assert_eq!(revisited.raw_content, stored.raw_content);
}

#[tokio::test]
async fn test_revisit_with_changed_content() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><title>Before</title></html>".to_string()))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><title>After</title></html>".to_string()))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, ":memory:");
    let mut coordinator = coordinator_for(&config);
    let url = format!("{}/", base_url);

    let t0 = now_epoch();
    coordinator.step_at(t0).await.unwrap();
    let before = coordinator.storage().find(&url).unwrap().unwrap();
    assert_eq!(before.title, "Before");

    let later = t0 + config.logic.revisit_interval + 1;
    assert_eq!(
        coordinator.step_at(later).await.unwrap(),
        Some(VisitOutcome::Changed)
    );

    let after = coordinator.storage().find(&url).unwrap().unwrap();
    assert_eq!(after.title, "After");
    assert_ne!(after.content_fingerprint, before.content_fingerprint);
    assert_eq!(coordinator.storage().count().unwrap(), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried_then_backed_off() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, ":memory:");
    let mut coordinator = coordinator_for(&config);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    let record = coordinator
        .storage()
        .find(&format!("{}/", base_url))
        .unwrap()
        .unwrap();
    assert_eq!(record.status, FetchStatus::FailedFetch);
    assert!(record.next_fetch > record.fetch_time);
}

#[tokio::test]
async fn test_dead_link_is_fetched_once_per_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/dead">d</a><a href="/a">a</a><a href="/b">b</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    for page in ["/a", "/b"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(r#"<a href="/dead">dead</a>"#.to_string()))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    // one request per attempt, three attempts in total
    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, ":memory:");
    config.logic.max_retries = 3;
    let mut coordinator = coordinator_for(&config);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.processed, 4);
    assert_eq!(report.stats.failed, 1);
    let dead = coordinator
        .storage()
        .find(&format!("{}/dead", base_url))
        .unwrap()
        .unwrap();
    assert_eq!(dead.status, FetchStatus::FailedFetch);
}

#[tokio::test]
async fn test_disallowed_paths_are_never_requested() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/private/secret">secret</a><a href="/public">public</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(html("<html>public</html>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("<html>secret</html>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, ":memory:");
    config.restrictions.disallowed_paths = vec!["/private".to_string()];
    let mut coordinator = coordinator_for(&config);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.processed, 2);
    assert_eq!(coordinator.storage().count().unwrap(), 2);
}

#[tokio::test]
async fn test_page_cap_limits_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<html>leaf</html>".to_string()))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, ":memory:");
    config.logic.max_pages = 2;
    let mut coordinator = coordinator_for(&config);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stop_reason, StopReason::PageCap);
    assert_eq!(report.stats.processed, 2);
    assert_eq!(coordinator.frontier().pending().len(), 2);
}
