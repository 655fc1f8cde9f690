mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn heartbeat_creates_then_updates_a_node() {
    let app = TestApp::spawn().await;

    let first: Value = app
        .client
        .post(format!("{}/nodes/node-a/heartbeat", app.base_url))
        .json(&json!({ "name": "builder-1", "labels": { "arch": "amd64", "gpu": false } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first["name"], "builder-1");
    assert_eq!(first["labels"]["arch"], "amd64");
    assert_eq!(first["labels"]["gpu"], false);

    // An empty labels mapping on a later heartbeat preserves the prior labels.
    let second: Value = app
        .client
        .post(format!("{}/nodes/node-a/heartbeat", app.base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(second["name"], "builder-1");
    assert_eq!(second["labels"]["arch"], "amd64");
}

#[tokio::test]
async fn label_integers_round_trip_as_integers() {
    let app = TestApp::spawn().await;

    let node: Value = app
        .client
        .post(format!("{}/nodes/node-a/heartbeat", app.base_url))
        .json(&json!({ "labels": { "cores": 8 } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(node["labels"]["cores"].is_i64() || node["labels"]["cores"].is_u64());
    assert_eq!(node["labels"]["cores"], 8);
}
