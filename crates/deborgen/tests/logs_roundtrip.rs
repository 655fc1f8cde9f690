mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn appended_logs_are_readable_verbatim() {
    let app = TestApp::spawn().await;

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
    let job_id = job["id"].as_str().unwrap();

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
    let lease_token = assignment["lease_token"].as_str().unwrap();

    let append_resp = app
        .client
        .post(format!("{}/jobs/{job_id}/logs", app.base_url))
        .json(&json!({
            "node_id": "node-a",
            "lease_token": lease_token,
            "text": "line one\nline two\n",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(append_resp.status(), 200);

    let logs: Value = app
        .client
        .get(format!("{}/jobs/{job_id}/logs", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(logs["text"], "line one\nline two\n");
}

#[tokio::test]
async fn logs_cannot_be_appended_to_a_job_that_is_not_running() {
    let app = TestApp::spawn().await;

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
    let job_id = job["id"].as_str().unwrap();

    let resp = app
        .client
        .post(format!("{}/jobs/{job_id}/logs", app.base_url))
        .json(&json!({
            "node_id": "node-a",
            "lease_token": "whatever",
            "text": "too early",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
}
