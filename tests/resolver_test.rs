//! Integration tests for the Terabox resolution pipeline against a mocked API.
//!
//! Run with: cargo test --test resolver_test

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use teragrab::resolver::{ResolveError, ResolvedMedia, ShareLink, TeraboxResolver};
use teragrab::telegram::delivery::{self, DeliveryPlan};

/// Stand up a mock server answering all three pipeline steps for the
/// `abc123` share with the given file entry.
async fn mock_happy_path(filename: &str, size: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/shorturlinfo"))
        .and(query_param("shorturl", "1abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "shareid": 123456u64,
            "uk": 789u64,
            "list": [{
                "fs_id": 111222333u64,
                "server_filename": filename,
                "size": size,
                "isdir": "0",
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/get-info"))
        .and(query_param("shorturl", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "sign": "testsign",
            "timestamp": 1_700_000_000u64,
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/get-download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "downloadLink": "https://d-test.terabox.com/file/xyz?fn=abc123.mp4",
        })))
        .mount(&server)
        .await;

    server
}

fn resolver_for(server: &MockServer) -> TeraboxResolver {
    TeraboxResolver::with_endpoints(
        vec![server.uri()],
        server.uri(),
        vec!["test-wrapper.host".to_string()],
    )
}

/// A 120 MB share resolves to exact metadata and, being above the inline
/// threshold, routes to a player page URL.
#[tokio::test]
async fn test_end_to_end_resolution_above_threshold() {
    let server = mock_happy_path("abc123.mp4", 125_829_120).await;
    let resolver = resolver_for(&server);

    let link = ShareLink::parse("https://terabox.com/s/abc123").unwrap();
    let media = resolver.resolve(&link).await.unwrap();

    assert_eq!(
        media,
        ResolvedMedia {
            direct_url: "https://d-test.terabox.com/file/xyz?fn=abc123.mp4".to_string(),
            filename: "abc123.mp4".to_string(),
            size_bytes: 125_829_120,
        }
    );

    // 120 MB > 50 MB: must route to the player page, never inline
    assert_eq!(delivery::plan(&media), DeliveryPlan::PlayerPage);
    let url = delivery::player_page_url("https://bot.example.com", "abc123", &media);
    assert!(url.contains("/player/abc123?"));
    assert!(url.contains("size=125829120"));
}

#[tokio::test]
async fn test_small_file_routes_inline() {
    let server = mock_happy_path("clip.mp4", 10 * 1024 * 1024).await;
    let resolver = resolver_for(&server);

    let link = ShareLink::parse("https://terabox.com/s/abc123").unwrap();
    let media = resolver.resolve(&link).await.unwrap();

    assert_eq!(media.size_bytes, 10 * 1024 * 1024);
    assert_eq!(delivery::plan(&media), DeliveryPlan::Inline);
}

/// The surl query-parameter URL shape resolves the same share.
#[tokio::test]
async fn test_query_surl_shape_resolves() {
    let server = mock_happy_path("abc123.mp4", 2048).await;
    let resolver = resolver_for(&server);

    let link = ShareLink::parse("https://www.terabox.com/sharing/link?surl=abc123").unwrap();
    let media = resolver.resolve(&link).await.unwrap();
    assert_eq!(media.filename, "abc123.mp4");
}

/// get-download failing falls back to get-downloadp plus the workers.dev
/// wrapper.
#[tokio::test]
async fn test_download_fallback_wraps_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/shorturlinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "shareid": 1u64,
            "uk": 2u64,
            "list": [{ "fs_id": "42", "server_filename": "v.mp4", "size": 1024u64, "isdir": "0" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/get-info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true, "sign": "s", "timestamp": 1u64,
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/get-download"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/get-downloadp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "downloadLink": "https://d-test.terabox.com/file/p",
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let link = ShareLink::parse("https://terabox.com/s/abc123").unwrap();
    let media = resolver.resolve(&link).await.unwrap();

    assert!(media.direct_url.starts_with("https://test-wrapper.host.workers.dev/?url="));
}

/// A dead primary mirror fails over to the next one.
#[tokio::test]
async fn test_mirror_failover() {
    let dead = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/shorturlinfo"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&dead)
        .await;

    let live = mock_happy_path("abc123.mp4", 4096).await;

    let resolver = TeraboxResolver::with_endpoints(
        vec![dead.uri(), live.uri()],
        live.uri(),
        vec!["test-wrapper.host".to_string()],
    );

    let link = ShareLink::parse("https://terabox.com/s/abc123").unwrap();
    let media = resolver.resolve(&link).await.unwrap();
    assert_eq!(media.filename, "abc123.mp4");
}

/// A persistently failing mirror is retried a bounded number of times and
/// then surfaces ExtractionError.
#[tokio::test]
async fn test_bounded_attempts_then_extraction_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/shorturlinfo"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let link = ShareLink::parse("https://terabox.com/s/abc123").unwrap();

    let err = resolver.resolve(&link).await.unwrap_err();
    assert!(matches!(err, ResolveError::Extraction(_)), "got: {:?}", err);
}

/// The sign service refusing the share surfaces ExtractionError.
#[tokio::test]
async fn test_sign_refusal_is_extraction_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/shorturlinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "shareid": 1u64,
            "uk": 2u64,
            "list": [{ "fs_id": "42", "server_filename": "v.mp4", "size": 1024u64, "isdir": "0" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/get-info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": false })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let link = ShareLink::parse("https://terabox.com/s/abc123").unwrap();

    let err = resolver.resolve(&link).await.unwrap_err();
    assert!(matches!(err, ResolveError::Extraction(_)));
}

/// A share containing only directories cannot be delivered.
#[tokio::test]
async fn test_directory_only_share_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/shorturlinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "shareid": 1u64,
            "uk": 2u64,
            "list": [{ "fs_id": "1", "server_filename": "folder", "isdir": "1" }]
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let link = ShareLink::parse("https://terabox.com/s/abc123").unwrap();

    let err = resolver.resolve(&link).await.unwrap_err();
    assert!(matches!(err, ResolveError::Extraction(_)));
}

/// Unrecognized domains are rejected at parse time — the resolver (and
/// therefore the network) is never reached.
#[test]
fn test_unsupported_domain_no_outbound_request() {
    let err = ShareLink::parse("https://dropbox.com/s/abc123").unwrap_err();
    assert!(matches!(err, ResolveError::UnsupportedDomain { .. }));
}

/// Direct download URLs resolve without any API round trip.
#[tokio::test]
async fn test_direct_url_needs_no_network() {
    // Point the resolver at an endpoint that answers nothing
    let resolver = TeraboxResolver::with_endpoints(
        vec!["http://127.0.0.1:1".to_string()],
        "http://127.0.0.1:1".to_string(),
        vec![],
    );

    let link = ShareLink::parse(
        "https://d-jp02-cpt.terabox.com/file/xyz?fn=direct.mp4&size=2097152&fid=1-2-3",
    )
    .unwrap();
    let media = resolver.resolve(&link).await.unwrap();

    assert_eq!(media.filename, "direct.mp4");
    assert_eq!(media.size_bytes, 2_097_152);
}
