//! HTTP contract tests for [`CanvasClient`].
//!
//! Each test mounts the server's response on a wiremock server and checks
//! how the client classifies it.

use pixelframe_api::{ApiConfig, ApiError, CanvasClient, CanvasEndpoint, CanvasSize, FetchOutcome, PixelUpdate};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> CanvasClient {
    CanvasClient::new(&ApiConfig::new(server.uri())).expect("valid config")
}

/// A base URL on a port nothing is listening on.
fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn size_parses_dimensions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/size"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"x": 800, "y": 600})))
        .expect(1)
        .mount(&server)
        .await;

    let size = client_for(&server).size().await.expect("size");
    assert_eq!(size, CanvasSize { x: 800, y: 600 });
}

#[tokio::test]
async fn size_non_success_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/size"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).size().await.expect_err("should fail");
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
}

#[tokio::test]
async fn full_image_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/webp")
                .set_body_bytes(vec![1u8, 2, 3, 4]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let bytes = client_for(&server).full_image().await.expect("image");
    assert_eq!(bytes.as_ref(), &[1, 2, 3, 4]);
}

#[tokio::test]
async fn since_sends_timestamp_and_parses_deltas() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/since"))
        .and(query_param("timestamp", "1700000000"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([[0, 0, "ff0000"], [1, 1, "00ff00"]])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).since(1_700_000_000).await.expect("outcome");
    assert_eq!(
        outcome,
        FetchOutcome::Deltas(vec![
            PixelUpdate::new(0, 0, "ff0000"),
            PixelUpdate::new(1, 1, "00ff00"),
        ])
    );
}

#[tokio::test]
async fn since_empty_array_is_empty_deltas() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/since"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let outcome = client_for(&server).since(5).await.expect("outcome");
    assert_eq!(outcome, FetchOutcome::Deltas(vec![]));
}

#[tokio::test]
async fn since_redirect_to_canvas_is_rebaseline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/since"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/canvas/"))
        .mount(&server)
        .await;
    // The redirect target must not be fetched by the client itself.
    Mock::given(method("GET"))
        .and(path("/canvas/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8]))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client_for(&server).since(5).await.expect("outcome");
    assert_eq!(outcome, FetchOutcome::Rebaseline);
}

#[tokio::test]
async fn since_redirect_with_base_prefix_is_rebaseline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/frame/canvas/since"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/canvas/"))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/frame", server.uri());
    let client = CanvasClient::new(&ApiConfig::new(base)).expect("valid config");
    let outcome = client.since(5).await.expect("outcome");
    assert_eq!(outcome, FetchOutcome::Rebaseline);
}

#[tokio::test]
async fn since_redirect_to_other_host_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/since"))
        .respond_with(
            ResponseTemplate::new(307).insert_header("location", "http://elsewhere.example/canvas/"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).since(5).await.expect_err("should fail");
    assert!(matches!(err, ApiError::Status { status: 307, .. }));
}

#[tokio::test]
async fn since_redirect_elsewhere_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/since"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login"))
        .mount(&server)
        .await;

    let err = client_for(&server).since(5).await.expect_err("should fail");
    assert!(matches!(err, ApiError::Status { status: 302, .. }));
}

#[tokio::test]
async fn since_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/since"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = client_for(&server).since(5).await.expect("outcome");
    assert_eq!(outcome, FetchOutcome::NotFound);
}

#[tokio::test]
async fn since_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/since"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"oops\": true}"))
        .mount(&server)
        .await;

    let err = client_for(&server).since(5).await.expect_err("should fail");
    assert!(matches!(err, ApiError::Parse(_)));
    assert!(err.server_responded());
}

#[tokio::test]
async fn since_unreachable_server_is_network_failure() {
    let client = CanvasClient::new(&ApiConfig::new(dead_base_url())).expect("valid config");

    let outcome = client.since(5).await.expect("outcome");
    assert!(matches!(outcome, FetchOutcome::NetworkFailure(_)));
}

#[tokio::test]
async fn full_image_unreachable_server_is_unreachable_error() {
    let client = CanvasClient::new(&ApiConfig::new(dead_base_url())).expect("valid config");

    let err = client.full_image().await.expect_err("should fail");
    assert!(matches!(err, ApiError::Unreachable(_)));
}

#[tokio::test]
async fn size_unreachable_server_is_unreachable_error() {
    let client = CanvasClient::new(&ApiConfig::new(dead_base_url())).expect("valid config");

    let err = client.size().await.expect_err("should fail");
    assert!(matches!(err, ApiError::Unreachable(_)));
    assert!(!err.server_responded());
}

#[tokio::test]
async fn slow_server_times_out_as_unreachable_on_every_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = ApiConfig {
        timeout_seconds: 1,
        ..ApiConfig::new(server.uri())
    };
    let client = CanvasClient::new(&config).expect("valid config");

    assert!(matches!(client.size().await, Err(ApiError::Unreachable(_))));
    assert!(matches!(client.full_image().await, Err(ApiError::Unreachable(_))));
    assert!(matches!(
        client.since(5).await,
        Ok(FetchOutcome::NetworkFailure(_))
    ));
}

#[tokio::test]
async fn probe_size_convenience_wrapper() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canvas/size"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"x": 2, "y": 3})))
        .mount(&server)
        .await;

    let size = pixelframe_api::probe_size(&server.uri()).await.expect("size");
    assert_eq!(size, CanvasSize { x: 2, y: 3 });
}
