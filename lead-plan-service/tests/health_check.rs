//! Integration tests for the operational endpoints.

mod common;

use common::TestApp;
use wiremock::MockServer;

#[tokio::test]
async fn health_check_returns_ok() {
    let completion = MockServer::start().await;
    let app = TestApp::spawn(&completion.uri(), None).await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "lead-plan-service");
}

#[tokio::test]
async fn readiness_reports_provider_and_webhook() {
    let completion = MockServer::start().await;
    let app = TestApp::spawn(
        &completion.uri(),
        Some("http://127.0.0.1:9/hook".to_string()),
    )
    .await;

    let response = app
        .client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ready");
    assert_eq!(body["service"], "lead-plan-service");
    assert_eq!(body["provider"], "openai");
    assert_eq!(body["webhook"], true);
}

#[tokio::test]
async fn metrics_endpoint_serves_prometheus_text() {
    let completion = MockServer::start().await;
    let app = TestApp::spawn(&completion.uri(), None).await;

    // One request so at least one labelled series exists.
    app.client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    let response = app
        .client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let text = response.text().await.expect("Failed to read body");
    assert!(text.contains("http_requests_total"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let completion = MockServer::start().await;
    let app = TestApp::spawn(&completion.uri(), None).await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .header("x-request-id", "intake-123")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.headers()["x-request-id"], "intake-123");
}
