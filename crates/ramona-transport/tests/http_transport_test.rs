//! Integration tests for HTTP transport

use assert_matches::assert_matches;
use ramona_core::retry::ExponentialBackoff;
use ramona_transport::{
    HttpRequest, HttpTransport, HttpTransportConfig, RequestError, RetryExecutor, Transport,
    TransportError,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_backoff() -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .slot(Duration::from_millis(1))
        .max_retries(3)
        .build()
}

#[tokio::test]
async fn test_http_request_builder() {
    let request = HttpRequest::get("https://example.com/search?q=rust")
        .with_header("Accept", "text/xml")
        .with_header("X-Trace", "1");

    assert_eq!(request.method, http::Method::GET);
    assert_eq!(request.url, "https://example.com/search?q=rust");
    assert_eq!(request.headers.len(), 2);
    assert_eq!(request.headers.get("Accept"), Some(&"text/xml".to_string()));
}

#[tokio::test]
async fn test_send_passes_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(header("accept", "text/xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<twinglydata/>", "text/xml"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let request = HttpRequest::get(format!("{}/search?q=rust", server.uri()))
        .with_header("Accept", "text/xml");
    let response = transport.send_http(&request).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.text().unwrap(), "<twinglydata/>");
    assert_eq!(response.get_header("Content-Type"), Some("text/xml"));
}

#[tokio::test]
async fn test_send_sets_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "Ramona-test/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::with_config(HttpTransportConfig {
        user_agent: "Ramona-test/1.0".to_string(),
        ..Default::default()
    })
    .unwrap();
    let response = transport
        .send_http(&HttpRequest::get(server.uri()))
        .await
        .unwrap();

    assert!(response.is_success());
}

#[tokio::test]
async fn test_send_returns_error_statuses_as_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(&HttpRequest::get(server.uri()))
        .await
        .unwrap();

    assert!(response.is_server_error());
    assert_eq!(response.text().unwrap(), "overloaded");
}

#[tokio::test]
async fn test_send_makes_exactly_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(&HttpRequest::get(server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 500);
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind and drop a listener so the port is known to be closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let uri = format!("http://127.0.0.1:{}/search", port);

    let transport = HttpTransport::new().unwrap();
    let err = transport
        .send_http(&HttpRequest::get(uri))
        .await
        .unwrap_err();

    assert_matches!(err, TransportError::Connection(_));
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let transport = HttpTransport::with_config(HttpTransportConfig {
        timeout: Duration::from_millis(100),
        ..Default::default()
    })
    .unwrap();
    let err = transport
        .send_http(&HttpRequest::get(server.uri()))
        .await
        .unwrap_err();

    assert_matches!(err, TransportError::Timeout);
}

#[tokio::test]
async fn test_executor_retries_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("found"))
        .with_priority(2)
        .expect(1)
        .mount(&server)
        .await;

    let executor =
        RetryExecutor::new(Arc::new(HttpTransport::new().unwrap())).with_strategy(fast_backoff());
    let body = executor
        .execute(&HttpRequest::get(server.uri()))
        .await
        .unwrap();

    assert_eq!(body.as_ref(), b"found");
}

#[tokio::test]
async fn test_executor_exhausts_against_failing_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("broken"))
        .expect(4)
        .mount(&server)
        .await;

    let executor =
        RetryExecutor::new(Arc::new(HttpTransport::new().unwrap())).with_strategy(fast_backoff());
    let err = executor
        .execute(&HttpRequest::get(server.uri()))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        RequestError::ExhaustedRetries { last_status: 500, attempts: 4, ref last_body }
            if last_body == "broken"
    );
}

#[tokio::test]
async fn test_executor_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad api key"))
        .expect(1)
        .mount(&server)
        .await;

    let executor =
        RetryExecutor::new(Arc::new(HttpTransport::new().unwrap())).with_strategy(fast_backoff());
    let err = executor
        .execute(&HttpRequest::get(server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.body().map(|b| b.as_ref()), Some(&b"bad api key"[..]));
}
