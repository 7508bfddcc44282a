//! Integration tests for `RedditConnector::search`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made. Covers the happy path and every error variant
//! the connector can produce.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mentionscan_connectors::{ConnectorError, PlatformConnector, RedditConnector};
use mentionscan_core::{FilterSpec, Platform, Sentiment};

fn test_connector(server: &MockServer) -> RedditConnector {
    RedditConnector::with_base_url("mentionscan-test/0.1", &server.uri())
        .expect("failed to build test RedditConnector")
}

fn keywords() -> Vec<String> {
    vec!["covid".to_owned()]
}

/// Minimal valid listing with one post.
fn one_post_json() -> serde_json::Value {
    json!({
        "data": {
            "children": [{
                "data": {
                    "id": "t3_abc",
                    "title": "covid wave",
                    "selftext": "numbers rising again",
                    "author": "epi_watcher",
                    "permalink": "/r/health/comments/abc/covid_wave/",
                    "ups": 12,
                    "num_comments": 4,
                    "created_utc": 1_700_000_000.0
                }
            }]
        }
    })
}

#[tokio::test]
async fn search_maps_listing_to_mentions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "covid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&one_post_json()))
        .mount(&server)
        .await;

    let connector = test_connector(&server);
    let mentions = connector
        .search(&keywords(), &FilterSpec::default(), Duration::from_secs(5))
        .await
        .expect("search should succeed");

    assert_eq!(mentions.len(), 1);
    let m = &mentions[0];
    assert_eq!(m.platform, Platform::Reddit);
    assert_eq!(m.source_id, "t3_abc");
    assert_eq!(m.author, "epi_watcher");
    assert_eq!(m.sentiment, Sentiment::Neutral);
    assert_eq!(m.engagement.likes, 12);
    assert_eq!(m.engagement.comments, 4);
    assert_eq!(
        m.url.as_deref(),
        Some("https://www.reddit.com/r/health/comments/abc/covid_wave/")
    );
}

#[tokio::test]
async fn empty_listing_yields_no_mentions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&json!({"data": {"children": []}})),
        )
        .mount(&server)
        .await;

    let mentions = test_connector(&server)
        .search(&keywords(), &FilterSpec::default(), Duration::from_secs(5))
        .await
        .expect("empty result is not an error");
    assert!(mentions.is_empty());
}

#[tokio::test]
async fn rate_limit_surfaces_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
        .mount(&server)
        .await;

    let err = test_connector(&server)
        .search(&keywords(), &FilterSpec::default(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ConnectorError::RateLimited {
                platform: Platform::Reddit,
                retry_after_secs: 17
            }
        ),
        "expected RateLimited, got: {err:?}"
    );
}

#[tokio::test]
async fn forbidden_maps_to_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = test_connector(&server)
        .search(&keywords(), &FilterSpec::default(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConnectorError::Unauthenticated { status: 403, .. }
    ));
}

#[tokio::test]
async fn non_json_body_maps_to_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = test_connector(&server)
        .search(&keywords(), &FilterSpec::default(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::MalformedResponse { .. }));
}

#[tokio::test]
async fn server_error_maps_to_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_connector(&server)
        .search(&keywords(), &FilterSpec::default(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::Unreachable { .. }));
}

#[tokio::test]
async fn slow_response_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&one_post_json())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = test_connector(&server)
        .search(&keywords(), &FilterSpec::default(), Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ConnectorError::Timeout { .. }),
        "expected Timeout, got: {err:?}"
    );
}
