use logcourier::{Client, ClientConfig, LogLevel, QueryOptions};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri(), "integration-key").with_flush_interval_ms(60_000).with_max_buffer_size(1000)
}

#[tokio::test]
async fn end_to_end_success_ships_a_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/v1/ingest")).respond_with(ResponseTemplate::new(202)).mount(&server).await;

    let client = Client::new(config_for(&server).with_batch_size(3)).unwrap();
    client.info("orders", "one").unwrap();
    client.info("orders", "two").unwrap();
    client.info("orders", "three").unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let metrics = client.metrics();
    assert_eq!(metrics.logs_sent, 3);
    assert_eq!(metrics.logs_dropped, 0);
    assert_eq!(client.buffered_len(), 0);
}

#[tokio::test]
async fn retries_are_counted_before_eventual_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/v1/ingest")).respond_with(ResponseTemplate::new(503)).up_to_n_times(2).mount(&server).await;
    Mock::given(method("POST")).and(path("/api/v1/ingest")).respond_with(ResponseTemplate::new(202)).mount(&server).await;

    let config = config_for(&server).with_batch_size(1).with_max_retries(3).with_retry_delay_ms(1);
    let client = Client::new(config).unwrap();
    client.info("orders", "retried message").unwrap();

    client.flush(None).await.unwrap();

    let metrics = client.metrics();
    assert_eq!(metrics.logs_sent, 1);
    assert_eq!(metrics.retries, 2);
}

#[tokio::test]
async fn breaker_trips_and_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/v1/ingest")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

    let config = config_for(&server).with_batch_size(1).with_max_retries(1).with_retry_delay_ms(1).with_breaker_threshold(1);
    let client = Client::new(config).unwrap();

    client.info("orders", "first failure").unwrap();
    client.flush(None).await.unwrap();

    let metrics = client.metrics();
    assert!(metrics.breaker_trips >= 1);

    client.info("orders", "dropped while open").unwrap();
    client.flush(None).await.unwrap();

    let metrics = client.metrics();
    assert!(metrics.logs_dropped >= 2);
}

#[tokio::test]
async fn buffer_overflow_end_to_end() {
    let server = MockServer::start().await;
    let config = config_for(&server).with_max_buffer_size(2).with_batch_size(100).with_flush_interval_ms(60_000);
    let client = Client::new(config).unwrap();

    client.info("orders", "one").unwrap();
    client.info("orders", "two").unwrap();
    let err = client.info("orders", "three").unwrap_err();
    assert!(err.is_buffer_full());
    assert_eq!(client.buffered_len(), 2);
    assert_eq!(client.metrics().logs_dropped, 1);
}

#[tokio::test]
async fn metadata_merge_prefers_caller_over_global() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/v1/ingest")).respond_with(ResponseTemplate::new(202)).mount(&server).await;

    let mut global = serde_json::Map::new();
    global.insert("env".into(), "prod".into());
    global.insert("region".into(), "us-east".into());

    let config = config_for(&server).with_batch_size(100).with_global_metadata(global);
    let client = Client::new(config).unwrap();

    let mut caller = serde_json::Map::new();
    caller.insert("region".into(), "eu-west".into());
    client.log_with_metadata("orders", LogLevel::Info, "custom region", caller).unwrap();

    client.flush(None).await.unwrap();
    assert_eq!(client.metrics().logs_sent, 1);
}

#[tokio::test]
async fn query_pass_through_returns_parsed_response() {
    let server = MockServer::start().await;
    let body = serde_json::json!({ "logs": [], "total": 0, "limit": 20, "offset": 0 });
    Mock::given(method("GET")).and(path("/api/v1/logs")).respond_with(ResponseTemplate::new(200).set_body_json(body)).mount(&server).await;

    let client = Client::new(config_for(&server)).unwrap();
    let options = QueryOptions { service: Some("orders".into()), limit: Some(20), ..QueryOptions::new() };
    let response = client.query(&options, None).await.unwrap();
    assert_eq!(response.limit, 20);
}

#[tokio::test]
async fn close_flushes_remaining_buffered_logs() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/v1/ingest")).respond_with(ResponseTemplate::new(202)).mount(&server).await;

    let config = config_for(&server).with_batch_size(100).with_flush_interval_ms(60_000);
    let client = Client::new(config).unwrap();
    client.info("orders", "buffered at shutdown").unwrap();

    client.close().await;
    assert_eq!(client.metrics().logs_sent, 1);
}
