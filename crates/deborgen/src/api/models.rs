use crate::ids::format_job_id;
use crate::jobs::model::{Job, Labels, Node};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire view of a [`Job`]. Kept separate from the row struct so the database
/// primary key never leaks past the API boundary in its raw integer form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobView {
    pub id: String,
    pub status: String,
    pub command: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub assigned_node_id: Option<String>,
    pub timeout_seconds: i64,
    pub attempts: i64,
    pub max_attempts: i64,
    pub exit_code: Option<i64>,
    pub failure_reason: Option<String>,
    pub artifact_urls: Vec<String>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            id: format_job_id(job.id),
            status: job.status.clone(),
            command: job.command.clone(),
            created_at: job.created_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
            assigned_node_id: job.assigned_node_id.clone(),
            timeout_seconds: job.timeout_seconds,
            attempts: job.attempts,
            max_attempts: job.max_attempts,
            exit_code: job.exit_code,
            failure_reason: job.failure_reason.clone(),
            artifact_urls: job.artifact_urls.0.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentView {
    pub job: JobView,
    pub lease_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    pub node_id: String,
    pub name: Option<String>,
    pub labels: Labels,
    pub last_seen_at: DateTime<Utc>,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        Self {
            node_id: node.node_id.clone(),
            name: node.name.clone(),
            labels: node.labels.0.clone(),
            last_seen_at: node.last_seen_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRequest {
    pub command: String,
    pub timeout_seconds: Option<i64>,
    pub max_attempts: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimQuery {
    pub node_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinishRequest {
    pub node_id: String,
    pub lease_token: String,
    pub exit_code: i64,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppendLogsRequest {
    pub node_id: String,
    pub lease_token: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogsResponse {
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeartbeatRequest {
    pub name: Option<String>,
    pub labels: Option<Labels>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
