use appvital_log_shipper::sender::{ClientError, IngestClient};
use appvital_log_shipper::{Batch, FlushTrigger, LogEntry, Metadata, ShipperConfig};
use serde_json::{Value, json};
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> IngestClient {
    let config = ShipperConfig {
        api_url: server.uri(),
        request_timeout: Duration::from_secs(2),
        ..ShipperConfig::default()
    };
    IngestClient::new(&config).unwrap()
}

fn entry(message: &str, metadata: Metadata) -> LogEntry {
    LogEntry::new("sender_test", "info", message, metadata)
}

#[tokio::test]
async fn send_batch_posts_a_logs_array() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ingest_log"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = Batch::new(
        vec![entry("one", Metadata::new()), entry("two", Metadata::new())],
        FlushTrigger::Explicit,
    );

    let receipt = assert_ok!(client.send_batch(&batch).await);
    assert_eq!(receipt.entries, 2);
    assert_eq!(receipt.status_code, 200);
    assert_eq!(receipt.batch_id, batch.id());
    assert!(receipt.bytes_sent > 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["message"], "one");
    assert_eq!(logs[1]["message"], "two");
    assert_eq!(logs[0]["service"], "sender_test");
    assert_eq!(logs[0]["level"], "INFO");

    assert_eq!(requests[0].headers.get("x-batch-size").unwrap(), "2");
    assert_eq!(
        requests[0].headers.get("x-flush-trigger").unwrap(),
        "explicit"
    );
}

#[tokio::test]
async fn send_batch_maps_non_2xx_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ingest_log"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = Batch::new(vec![entry("doomed", Metadata::new())], FlushTrigger::Size);

    let result = client.send_batch(&batch).await;
    match result.unwrap_err() {
        ClientError::HttpError { status, .. } => assert_eq!(status, 500),
        other => panic!("expected HttpError, got {other:?}"),
    }

    let stats = client.connection_stats();
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.failed_requests, 1);
}

#[tokio::test]
async fn send_batch_surfaces_connection_failures() {
    let config = ShipperConfig {
        // Nothing listens on port 1.
        api_url: "http://127.0.0.1:1".to_string(),
        request_timeout: Duration::from_millis(500),
        ..ShipperConfig::default()
    };
    let client = IngestClient::new(&config).unwrap();
    let batch = Batch::new(vec![entry("unroutable", Metadata::new())], FlushTrigger::Timer);

    let result = client.send_batch(&batch).await;
    assert!(matches!(
        result,
        Err(ClientError::Network(_) | ClientError::RequestTimeout(_))
    ));
    assert_eq!(client.connection_stats().failed_requests, 1);
}

#[tokio::test]
async fn send_single_posts_a_flat_entry_with_nested_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ingest_single_log"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let metadata = json!({"request_id": "abc-123"})
        .as_object()
        .cloned()
        .unwrap();
    let single = entry("direct", metadata);

    assert_ok!(client.send_single(&single).await);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(body["service"], "sender_test");
    assert_eq!(body["level"], "INFO");
    assert_eq!(body["message"], "direct");
    assert!(body["timestamp"].is_string());
    // Single-entry shape nests metadata instead of flattening it.
    assert_eq!(body["metadata"]["request_id"], "abc-123");
}

#[tokio::test]
async fn send_single_omits_empty_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ingest_single_log"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_ok!(client.send_single(&entry("bare", Metadata::new())).await);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("metadata").is_none());
}

#[tokio::test]
async fn endpoints_are_derived_from_the_api_url() {
    let config = ShipperConfig {
        api_url: "http://monitoring.internal:8000".to_string(),
        ..ShipperConfig::default()
    };
    let client = IngestClient::new(&config).unwrap();

    assert_eq!(
        client.batch_endpoint().as_str(),
        "http://monitoring.internal:8000/api/ingest_log"
    );
    assert_eq!(
        client.single_endpoint().as_str(),
        "http://monitoring.internal:8000/api/ingest_single_log"
    );
}

#[tokio::test]
async fn stats_accumulate_across_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ingest_log"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ingest_log"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let failing = Batch::new(vec![entry("x", Metadata::new())], FlushTrigger::Size);
    let passing = Batch::new(vec![entry("y", Metadata::new())], FlushTrigger::Size);

    assert!(client.send_batch(&failing).await.is_err());
    assert_ok!(client.send_batch(&passing).await);

    let stats = client.connection_stats();
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.successful_requests, 1);
    assert_eq!(stats.failed_requests, 1);
}
