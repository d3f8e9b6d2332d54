//! Integration tests for the reqwest transport using wiremock
//!
//! These tests verify the wire-level behavior of `ReqwestTransport`:
//! query encoding, headers, basic auth, body decoding and failure mapping.

use std::sync::Arc;
use std::time::Duration;
use tweetscout_core::{Error, GetRequest, PostRequest, Transport};
use tweetscout_egress::client::{HttpClientConfig, ReqwestTransport};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{basic_auth, header, method, path, query_param},
};

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(&HttpClientConfig::default()).unwrap()
}

#[tokio::test]
async fn test_get_sends_params_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.1/search/tweets.json"))
        .and(query_param("q", "from:rustlang #async"))
        .and(query_param("count", "30"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "statuses": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = GetRequest::new(format!("{}/1.1/search/tweets.json", mock_server.uri()))
        .param("q", "from:rustlang #async")
        .param("count", "30")
        .header("Authorization", "Bearer T1");

    let response = transport().get(request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, serde_json::json!({"statuses": []}));
}

#[tokio::test]
async fn test_post_sends_basic_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(query_param("grant_type", "client_credentials"))
        .and(basic_auth("test-key", "test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "bearer",
            "access_token": "T1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = PostRequest::new(format!("{}/oauth2/token", mock_server.uri()))
        .param("grant_type", "client_credentials")
        .basic_auth("test-key", "test-secret");

    let response = transport().post(request).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.body["access_token"], "T1");
}

#[tokio::test]
async fn test_error_status_is_returned_not_raised() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let response = transport()
        .get(GetRequest::new(mock_server.uri()))
        .await
        .unwrap();

    assert!(response.is_unauthorized());
    assert_eq!(response.body, serde_json::json!("Unauthorized"));
}

#[tokio::test]
async fn test_empty_body_decodes_to_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let response = transport()
        .get(GetRequest::new(mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    assert!(response.body.is_null());
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig {
        timeout_secs: 1,
        ..Default::default()
    };
    let transport = ReqwestTransport::new(&config).unwrap();

    let err = transport
        .get(GetRequest::new(mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(ref m) if m.contains("timeout")));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind and release a port so nothing is listening on it
    let uri = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };

    let err = transport().get(GetRequest::new(uri)).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_concurrent_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(20)
        .mount(&mock_server)
        .await;

    let transport = Arc::new(transport());
    let mut handles = vec![];
    for i in 0..20 {
        let transport = transport.clone();
        let url = format!("{}/test/{}", mock_server.uri(), i);
        handles.push(tokio::spawn(async move {
            let response = transport.get(GetRequest::new(url)).await;
            assert!(response.is_ok(), "Concurrent request {} should succeed", i);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}
