mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn no_token_configured_allows_anonymous_access() {
    let app = TestApp::spawn_with_config(300, None).await;

    let resp = app
        .client
        .post(format!("{}/jobs", app.base_url))
        .json(&json!({ "command": "echo hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn missing_bearer_header_is_rejected_when_token_configured() {
    let app = TestApp::spawn_with_config(300, Some("s3cret")).await;

    let resp = app
        .client
        .post(format!("{}/jobs", app.base_url))
        .json(&json!({ "command": "echo hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn correct_bearer_header_is_accepted() {
    let app = TestApp::spawn_with_config(300, Some("s3cret")).await;

    let resp = app
        .client
        .post(format!("{}/jobs", app.base_url))
        .bearer_auth("s3cret")
        .json(&json!({ "command": "echo hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn health_endpoint_is_never_gated() {
    let app = TestApp::spawn_with_config(300, Some("s3cret")).await;

    let resp = app
        .client
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}
