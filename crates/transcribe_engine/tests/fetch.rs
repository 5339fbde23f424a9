use std::time::Duration;

use transcribe_engine::{
    fetch_source, FailureKind, FetchSettings, Fetcher, ReqwestFetcher, SourceReference,
    DEFAULT_USER_AGENT,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetcher_returns_html_and_sends_crawler_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/doc", server.uri());

    let output = fetcher.fetch(&url).await.expect("fetch ok");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.final_url, output.metadata.original_url);
    assert_eq!(output.metadata.redirect_count, 0);
    assert!(output
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(output.bytes, b"<html>ok</html>");
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/large", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn fetcher_counts_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let output = fetcher
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap();
    assert_eq!(output.metadata.redirect_count, 1);
    assert!(output.metadata.final_url.ends_with("/new"));
    assert_eq!(output.bytes, b"moved");
}

#[tokio::test]
async fn fetcher_rejects_non_http_schemes() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let err = fetcher.fetch("ftp://example.com/file").await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedScheme {
            scheme: "ftp".to_string()
        }
    );
}

#[tokio::test]
async fn local_source_is_read_and_decoded() {
    let temp = tempfile::TempDir::new().unwrap();
    let file = temp.path().join("page.html");
    std::fs::write(&file, "<html><body><p>caf\u{e9}</p></body></html>").unwrap();

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let source = SourceReference::Local(file);
    let html = fetch_source(&fetcher, &source).await.unwrap();
    assert!(html.contains("caf\u{e9}"));
}

#[tokio::test]
async fn missing_local_file_is_an_io_failure() {
    let temp = tempfile::TempDir::new().unwrap();
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let source = SourceReference::Local(temp.path().join("nope.html"));

    let err = fetch_source(&fetcher, &source).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
    assert!(err.message.contains("nope.html"));
}
