mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn finish_from_a_different_node_is_rejected() {
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

    let resp = app
        .client
        .post(format!("{}/jobs/{job_id}/finish", app.base_url))
        .json(&json!({
            "node_id": "node-b",
            "lease_token": lease_token,
            "exit_code": 0,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("different worker"));
}

#[tokio::test]
async fn finish_with_the_wrong_lease_token_is_rejected() {
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

    app.client
        .get(format!("{}/jobs/next", app.base_url))
        .query(&[("node_id", "node-a")])
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .post(format!("{}/jobs/{job_id}/finish", app.base_url))
        .json(&json!({
            "node_id": "node-a",
            "lease_token": "not-the-real-token",
            "exit_code": 0,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn two_workers_never_claim_the_same_job() {
    let app = TestApp::spawn().await;

    app.client
        .post(format!("{}/jobs", app.base_url))
        .json(&json!({ "command": "echo hi" }))
        .send()
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        app.client
            .get(format!("{}/jobs/next", app.base_url))
            .query(&[("node_id", "node-a")])
            .send(),
        app.client
            .get(format!("{}/jobs/next", app.base_url))
            .query(&[("node_id", "node-b")])
            .send(),
    );

    let a_status = a.unwrap().status();
    let b_status = b.unwrap().status();

    let claimed = [a_status, b_status]
        .into_iter()
        .filter(|s| *s == 200)
        .count();
    let empty = [a_status, b_status]
        .into_iter()
        .filter(|s| *s == 204)
        .count();

    assert_eq!(claimed, 1);
    assert_eq!(empty, 1);
}
