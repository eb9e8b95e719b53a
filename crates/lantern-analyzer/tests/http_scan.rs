//! End-to-end scan of a mock HTTP server.

use httpmock::prelude::*;
use lantern_analyzer::{create_analyzer, AnalyzerOptions, ScanHooks};
use lantern_config::UserConfig;

#[tokio::test]
async fn test_http_scan_reports_header_and_markup_problems() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("content-type", "text/html")
                .header("x-powered-by", "Express")
                .body("<html><head><title>mock</title></head><body></body></html>");
        })
        .await;

    let config: UserConfig = toml::from_str(
        r#"
[hints]
"no-disallowed-headers" = "warning"
"meta-charset-utf8" = "warning"
"#,
    )
    .expect("parse config");
    let analyzer =
        create_analyzer(&config, AnalyzerOptions::default()).expect("create analyzer");

    let target = server.url("/");
    let results = analyzer
        .analyze(&[target.as_str()], &ScanHooks::new())
        .await
        .expect("scan succeeds");

    let hints: Vec<&str> = results[0]
        .problems
        .iter()
        .map(|p| p.hint_id.as_str())
        .collect();
    assert!(hints.contains(&"no-disallowed-headers"), "got {hints:?}");
    assert!(hints.contains(&"meta-charset-utf8"), "got {hints:?}");
    assert!(analyzer.passed(&results), "warnings pass at the error threshold");
}

#[tokio::test]
async fn test_ignored_url_suppresses_problems() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("content-type", "text/html")
                .header("x-powered-by", "Express")
                .body("<html><head><title>mock</title></head><body></body></html>");
        })
        .await;

    let config: UserConfig = toml::from_str(
        r#"
[hints]
"no-disallowed-headers" = "warning"

[[ignored_urls]]
pattern = "127\\.0\\.0\\.1"
"#,
    )
    .expect("parse config");
    let analyzer =
        create_analyzer(&config, AnalyzerOptions::default()).expect("create analyzer");

    let target = server.url("/");
    let results = analyzer
        .analyze(&[target.as_str()], &ScanHooks::new())
        .await
        .expect("scan succeeds");

    assert!(results[0].problems.is_empty(), "got {:?}", results[0].problems);
}
