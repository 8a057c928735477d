use logstack_shipper::formatter::{LogStackFormatter, RawRecord, SourceLevel};
use logstack_shipper::sender::{ClientOptions, DeliveryError, LogStackClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base_url: &str) -> LogStackClient {
    LogStackClient::new(base_url, "abc123", ClientOptions::default()).unwrap()
}

fn sample_entries() -> Vec<logstack_shipper::formatter::LogEntry> {
    let formatter = LogStackFormatter::new("svc", "test", vec![]);
    vec![formatter.format(RawRecord::new(SourceLevel::Info, "hello"))]
}

#[tokio::test]
async fn ingest_posts_the_envelope_with_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/logs:ingest"))
        .and(header("Authorization", "Bearer abc123"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "entries": [{ "message": "hello", "level": "INFO", "service": "svc" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accepted": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server.uri())
        .ingest(&sample_entries(), None)
        .await
        .unwrap();
    assert_eq!(response.get("accepted"), Some(&json!(1)));
}

#[tokio::test]
async fn ingest_carries_the_batch_id_header_when_given() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/logs:ingest"))
        .and(header("X-Batch-Id", "batch-42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server.uri())
        .ingest(&sample_entries(), Some("batch-42"))
        .await
        .unwrap();
}

#[tokio::test]
async fn empty_or_invalid_response_bodies_yield_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/logs:ingest"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let response = client(&server.uri())
        .ingest(&sample_entries(), None)
        .await
        .unwrap();
    assert!(response.is_empty());
}

#[tokio::test]
async fn non_2xx_status_surfaces_as_delivery_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/logs:ingest"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let error = client(&server.uri())
        .ingest(&sample_entries(), None)
        .await
        .unwrap_err();
    match error {
        DeliveryError::Http { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Nothing listens on this port.
    let client = client("http://127.0.0.1:9");
    let error = client.ingest(&sample_entries(), None).await.unwrap_err();
    assert!(matches!(
        error,
        DeliveryError::Transport(_) | DeliveryError::Timeout
    ));
}

#[tokio::test]
async fn ping_is_true_only_for_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server.uri()).ping().await);
}

#[tokio::test]
async fn ping_carries_the_bearer_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(client(&server.uri()).ping().await);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let auth = requests[0].headers.get("Authorization").unwrap();
    assert_eq!(auth.to_str().unwrap(), "Bearer abc123");
}

#[tokio::test]
async fn ping_never_raises_on_error_status_or_dead_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!client(&server.uri()).ping().await);
    assert!(!client("http://127.0.0.1:9").ping().await);
}

#[tokio::test]
async fn request_timeout_is_classified_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/logs:ingest"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let options = ClientOptions {
        request_timeout: Duration::from_millis(100),
        ..ClientOptions::default()
    };
    let client = LogStackClient::new(&server.uri(), "abc123", options).unwrap();
    let error = client.ingest(&sample_entries(), None).await.unwrap_err();
    assert!(matches!(error, DeliveryError::Timeout));
}
