use crate::jobs::model::{Job, Labels, Node};
use crate::jobs::store::{Store, StoreError};
use std::sync::Arc;

/// Thin policy layer above [`Store`]: owns the lease duration and exposes
/// exactly the state transitions the HTTP surface needs, nothing more.
#[derive(Clone)]
pub struct Lifecycle {
    store: Arc<Store>,
    lease_seconds: i64,
}

impl Lifecycle {
    pub fn new(store: Arc<Store>, lease_seconds: i64) -> Self {
        Self {
            store,
            lease_seconds,
        }
    }

    pub async fn create_job(
        &self,
        command: String,
        timeout_seconds: i64,
        max_attempts: i64,
    ) -> Result<Job, StoreError> {
        self.store
            .create_job(command, timeout_seconds, max_attempts)
            .await
    }

    pub async fn get_job(&self, id: i64) -> Result<Job, StoreError> {
        self.store.get_job(id).await
    }

    pub async fn list_jobs(
        &self,
        status: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Job>, StoreError> {
        self.store.list_jobs(status, limit).await
    }

    pub async fn claim_next_job(
        &self,
        node_id: &str,
    ) -> Result<Option<(Job, String)>, StoreError> {
        self.store.claim_next_job(node_id, self.lease_seconds).await
    }

    pub async fn finish_job(
        &self,
        id: i64,
        node_id: &str,
        lease_token: &str,
        exit_code: i64,
        failure_reason: Option<String>,
    ) -> Result<Job, StoreError> {
        self.store
            .finish_job(id, node_id, lease_token, exit_code, failure_reason)
            .await
    }

    pub async fn append_logs(
        &self,
        id: i64,
        node_id: &str,
        lease_token: &str,
        text: &str,
    ) -> Result<(), StoreError> {
        self.store.append_logs(id, node_id, lease_token, text).await
    }

    pub async fn read_logs(&self, id: i64) -> Result<String, StoreError> {
        self.store.read_logs(id).await
    }

    pub async fn heartbeat_node(
        &self,
        node_id: &str,
        name: Option<String>,
        labels: Option<Labels>,
    ) -> Result<Node, StoreError> {
        self.store.heartbeat_node(node_id, name, labels).await
    }
}
