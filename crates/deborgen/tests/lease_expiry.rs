mod common;

use common::TestApp;
use serde_json::{json, Value};

/// A negative lease duration puts `lease_expires_at` in the past the
/// instant the lease is minted, forcing immediate expiry.
async fn claim_with_expired_lease(app: &TestApp) -> (String, String) {
    let job: Value = app
        .client
        .post(format!("{}/jobs", app.base_url))
        .json(&json!({ "command": "echo hi" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let job_id = job["id"].as_str().unwrap().to_string();

    let assignment: Value = app
        .client
        .get(format!("{}/jobs/next", app.base_url))
        .query(&[("node_id", "node-a")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let lease_token = assignment["lease_token"].as_str().unwrap().to_string();

    (job_id, lease_token)
}

#[tokio::test]
async fn finish_on_an_expired_lease_is_rejected() {
    let app = TestApp::spawn_with_config(-1, None).await;
    let (job_id, lease_token) = claim_with_expired_lease(&app).await;

    let resp = app
        .client
        .post(format!("{}/jobs/{job_id}/finish", app.base_url))
        .json(&json!({ "node_id": "node-a", "lease_token": lease_token, "exit_code": 0 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "lease has expired");
}

#[tokio::test]
async fn logs_on_an_expired_lease_are_rejected() {
    let app = TestApp::spawn_with_config(-1, None).await;
    let (job_id, lease_token) = claim_with_expired_lease(&app).await;

    let resp = app
        .client
        .post(format!("{}/jobs/{job_id}/logs", app.base_url))
        .json(&json!({ "node_id": "node-a", "lease_token": lease_token, "text": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "lease has expired");
}
