//! End-to-end harvest tests
//!
//! These tests use wiremock to serve trending pages and run the real HTTP
//! transport, the fetcher and the whole dated run against them.

use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use trending_harvester::archive::read_index;
use trending_harvester::config::{load_config, Config};
use trending_harvester::harvest::{
    build_http_client, harvest, Fetcher, HttpTransport, RetryPolicy, TokioSleeper, Transport,
    TransportError,
};
use trending_harvester::output::{parse_report, RunOutcome};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GO_PAGE: &str = r#"<!DOCTYPE html><html><body>
<article class="Box-row">
  <h2 class="h3 lh-condensed"><a href="/golang/go">golang / go</a></h2>
  <p class="col-9 color-fg-muted my-1 pr-4">The Go programming language</p>
  <div class="f6 color-fg-muted mt-2">
    <a class="Link--muted d-inline-block mr-3" href="/golang/go/stargazers"><svg aria-label="star" class="octicon octicon-star"></svg> 121,004</a>
    <a class="Link--muted d-inline-block mr-3" href="/golang/go/forks"><svg aria-label="fork" class="octicon octicon-repo-forked"></svg> 17,410</a>
    <span class="d-inline-block float-sm-right"><svg class="octicon octicon-star"></svg> 98 stars today</span>
  </div>
</article>
<article class="Box-row">
  <h2 class="h3 lh-condensed"><a href="/charmbracelet/bubbletea">charmbracelet / bubbletea</a></h2>
  <div class="f6 color-fg-muted mt-2">
    <a class="Link--muted d-inline-block mr-3" href="/charmbracelet/bubbletea/stargazers"><svg aria-label="star" class="octicon octicon-star"></svg> 27,000</a>
  </div>
</article>
</body></html>"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Loads a validated config pointing at the mock server and archive root
fn test_config(base_url: &str, root: &Path, languages: &[&str], extra_scraper: &str) -> Config {
    let languages = languages
        .iter()
        .map(|l| format!("{:?}", l))
        .collect::<Vec<_>>()
        .join(", ");
    let file = write_config(&format!(
        r#"
languages = [{languages}]

[scraper]
base-url = "{base_url}"
concurrency-limit = 2
polite-delay-min-ms = 0
polite-delay-max-ms = 0
{extra_scraper}

[retry]
max-attempts = 3
base-delay-ms = 1
max-delay-ms = 5
jitter-ms = 0

[archive]
root = {root:?}
sweep = "never"
"#,
        root = root.display().to_string(),
    ));
    load_config(file.path()).unwrap()
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(5),
        jitter: std::time::Duration::ZERO,
    }
}

#[tokio::test]
async fn test_http_transport_sends_browser_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trending/go"))
        .and(query_param("since", "daily"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GO_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(build_http_client(None).unwrap());
    let url = format!("{}/trending/go?since=daily", mock_server.uri());

    let body = transport.get(&url).await.unwrap();

    assert!(body.contains("golang / go"));
}

#[tokio::test]
async fn test_http_transport_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(build_http_client(None).unwrap());
    let result = transport.get(&format!("{}/trending/go", mock_server.uri())).await;

    assert!(matches!(result, Err(TransportError::Status(503))));
}

#[tokio::test]
async fn test_custom_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "harvest-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GO_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(build_http_client(Some("harvest-test/1.0")).unwrap());

    assert!(transport.get(&mock_server.uri()).await.is_ok());
}

#[tokio::test]
async fn test_fetcher_retries_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trending/go"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/trending/go"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GO_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(
        HttpTransport::new(build_http_client(None).unwrap()),
        TokioSleeper,
    );
    let url = format!("{}/trending/go?since=daily", mock_server.uri());

    let body = fetcher.fetch(&url, &fast_policy(3)).await.unwrap();

    assert!(body.contains("bubbletea"));
}

#[tokio::test]
async fn test_fetcher_gives_up_after_max_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(
        HttpTransport::new(build_http_client(None).unwrap()),
        TokioSleeper,
    );

    let err = fetcher
        .fetch(&format!("{}/trending/zig", mock_server.uri()), &fast_policy(3))
        .await
        .unwrap_err();

    assert_eq!(err.attempts, 3);
    assert_eq!(err.cause().to_string(), "HTTP 500");
}

#[tokio::test]
async fn test_full_run_writes_report_and_metadata() {
    let mock_server = MockServer::start().await;
    let archive = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/trending/go"))
        .and(query_param("since", "daily"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GO_PAGE))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/trending/rust"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h3>It looks like we don't have any trending repositories.</h3></body></html>"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/trending/zig"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri(), archive.path(), &["Go", "Rust", "Zig"], "");
    let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    let report = harvest(&config, date).await.unwrap();

    assert_eq!(report.summary.outcome(), RunOutcome::Partial);
    assert_eq!(report.report_path, archive.path().join("2024/01/2024-01-02.md"));

    let markdown = fs::read_to_string(&report.report_path).unwrap();
    assert!(markdown.starts_with("# Trending Repositories for 2024-01-02\n"));
    assert!(markdown.contains("- [Go](#go)\n- [Rust](#rust)\n- [Zig](#zig)\n"));
    assert!(markdown.contains(&format!(
        "| 1 | [golang/go]({}/golang/go) | The Go programming language | 121,004 | 17,410 | 98 stars today |",
        mock_server.uri()
    )));
    assert!(markdown.contains(&format!(
        "| 2 | [charmbracelet/bubbletea]({}/charmbracelet/bubbletea) | No description | 27,000 | 0 | N/A |",
        mock_server.uri()
    )));
    assert!(markdown.contains("## Rust\n\nNo trending repositories found.\n"));
    assert!(markdown.contains("## Zig\n\nFailed to scrape: HTTP 500\n"));

    let parsed = parse_report(&markdown);
    assert_eq!(parsed.date, Some(date));
    assert_eq!(parsed.results.len(), 3);
    assert_eq!(parsed.results[0].records().len(), 2);

    let index = read_index(archive.path()).unwrap().unwrap();
    assert_eq!(index.years["2024"]["01"], vec!["02".to_string()]);
}

#[tokio::test]
async fn test_all_failed_run() {
    let mock_server = MockServer::start().await;
    let archive = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri(), archive.path(), &["Go", "Zig"], "");
    let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

    let report = harvest(&config, date).await.unwrap();

    assert_eq!(report.summary.outcome(), RunOutcome::AllFailed);
    assert!(report.report_path.is_file());
    assert_eq!(report.summary.failed.len(), 2);
}

#[tokio::test]
async fn test_configured_user_agent_reaches_server() {
    let mock_server = MockServer::start().await;
    let archive = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(header("user-agent", "archiver/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GO_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(
        &mock_server.uri(),
        archive.path(),
        &["Go"],
        r#"user-agent = "archiver/2.0""#,
    );

    let report = harvest(&config, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        .await
        .unwrap();

    assert_eq!(report.summary.outcome(), RunOutcome::AllSucceeded);
}
