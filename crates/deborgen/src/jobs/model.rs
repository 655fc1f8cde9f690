use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
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
    pub artifact_urls: sqlx::types::Json<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Lease {
    pub job_id: i64,
    pub node_id: String,
    pub lease_token: String,
    pub lease_expires_at: DateTime<Utc>,
}

/// A scalar label value. Kept untagged and variant-ordered (string, then
/// integer, then float, then bool) so an integer in JSON round-trips as an
/// integer instead of widening to a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

pub type Labels = BTreeMap<String, LabelValue>;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Node {
    pub node_id: String,
    pub name: Option<String>,
    pub labels: sqlx::types::Json<Labels>,
    pub last_seen_at: DateTime<Utc>,
}
