//! JSON pass-through tests.
//!
//! This module tests the REST surface of [`ThingsBoardClient`]:
//! - 404 becomes `None` / `false` instead of an error
//! - Empty bodies become `Null`
//! - Error bodies are parsed into `ApiError` messages
//! - Query parameters and JSON bodies are forwarded unchanged
//! - HTTP 429 retries honour `max_retries` and a capped `Retry-After`
//!
//! # What this does NOT handle
//! - Authentication (see interceptor_tests.rs)

mod common;

use common::*;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};

async fn api_key_client(server: &MockServer) -> ThingsBoardClient {
    ThingsBoardClient::builder()
        .base_url(server.uri())
        .auth_strategy(api_key_strategy("tb_key"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_get_optional_maps_404_to_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/device/784f394c-42b6-435a-983c-b7beff2784f9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "status": 404,
            "message": "Requested item wasn't found!",
            "errorCode": 32,
        })))
        .mount(&mock_server)
        .await;

    let client = api_key_client(&mock_server).await;
    let device = client
        .get_optional("/api/device/784f394c-42b6-435a-983c-b7beff2784f9", &[])
        .await
        .unwrap();

    assert!(device.is_none());
}

#[tokio::test]
async fn test_get_json_404_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/device/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = api_key_client(&mock_server).await;
    let err = client.get_json("/api/device/missing", &[]).await.unwrap_err();

    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_get_json_forwards_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/plugins/telemetry/DEVICE/abc/values/timeseries"))
        .and(query_param("keys", "temperature,humidity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "temperature": [{ "ts": 1_700_000_000_000_i64, "value": "21.5" }],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = api_key_client(&mock_server).await;
    let values = client
        .get_json(
            "/api/plugins/telemetry/DEVICE/abc/values/timeseries",
            &[("keys", "temperature,humidity")],
        )
        .await
        .unwrap();

    assert_eq!(values["temperature"][0]["value"], "21.5");
}

#[tokio::test]
async fn test_post_json_sends_body() {
    let mock_server = MockServer::start().await;
    let device = serde_json::json!({ "name": "Thermostat A", "type": "thermostat" });

    Mock::given(method("POST"))
        .and(path("/api/device"))
        .and(body_json(&device))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": { "entityType": "DEVICE", "id": "abc" },
            "name": "Thermostat A",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = api_key_client(&mock_server).await;
    let created = client.post_json("/api/device", &device).await.unwrap();

    assert_eq!(created["id"]["id"], "abc");
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/plugins/telemetry/DEVICE/abc/timeseries/ANY"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = api_key_client(&mock_server).await;
    let result = client
        .post_json(
            "/api/plugins/telemetry/DEVICE/abc/timeseries/ANY",
            &serde_json::json!({ "temperature": 22 }),
        )
        .await
        .unwrap();

    assert!(result.is_null());
}

#[tokio::test]
async fn test_delete_reports_existence() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/device/abc"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/device/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = api_key_client(&mock_server).await;

    assert!(client.delete("/api/device/abc").await.unwrap());
    assert!(!client.delete("/api/device/gone").await.unwrap());
}

#[tokio::test]
async fn test_server_error_message_is_parsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tenant/assets"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": 400,
            "message": "Parameter 'pageSize' is not present",
            "errorCode": 31,
        })))
        .mount(&mock_server)
        .await;

    let client = api_key_client(&mock_server).await;
    let err = client.get_json("/api/tenant/assets", &[]).await.unwrap_err();

    match err {
        ClientError::ApiError {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Parameter 'pageSize' is not present");
        }
        other => panic!("Expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tenant/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&mock_server)
        .await;

    let client = api_key_client(&mock_server).await;
    let err = client.get_json("/api/tenant/assets", &[]).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_relative_path_is_rejected() {
    let mock_server = MockServer::start().await;
    let client = api_key_client(&mock_server).await;

    let err = client.get_json("api/tenant/assets", &[]).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidUrl(_)));
}

#[tokio::test]
async fn test_zero_max_retries_sends_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tenant/devices"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ThingsBoardClient::builder()
        .base_url(mock_server.uri())
        .auth_strategy(api_key_strategy("tb_key"))
        .max_retries(0)
        .build()
        .unwrap();

    let err = client.get_json("/api/tenant/devices", &[]).await.unwrap_err();
    assert!(matches!(err, ClientError::MaxRetriesExceeded(1)));
}

#[tokio::test]
async fn test_retry_after_is_capped_at_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tenant/devices"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "86400"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tenant/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [],
            "totalElements": 0,
            "hasNext": false,
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ThingsBoardClient::builder()
        .base_url(mock_server.uri())
        .auth_strategy(api_key_strategy("tb_key"))
        .timeout(Duration::from_secs(1))
        .max_retries(1)
        .build()
        .unwrap();

    let page = tokio::time::timeout(
        Duration::from_secs(10),
        client.get_json("/api/tenant/devices", &[]),
    )
    .await
    .expect("backoff should be capped at the request timeout")
    .unwrap();
    assert_eq!(page["totalElements"], 0);
}
