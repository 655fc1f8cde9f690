use crate::ids::generate_lease_token;
use crate::jobs::model::{Job, JobStatus, Labels, Lease, Node};
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    Conflict(&'static str),
    Validation(String),
    Internal(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "not found"),
            StoreError::Conflict(msg) => write!(f, "{msg}"),
            StoreError::Validation(msg) => write!(f, "{msg}"),
            StoreError::Internal(e) => write!(f, "internal error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Internal(e.into())
    }
}

/// SQLite-backed persistence for jobs, leases, logs and nodes.
///
/// SQLite has no `SELECT ... FOR UPDATE SKIP LOCKED`, so writers are
/// serialized through `writer` instead of relying on row-level locking.
/// Reads are not gated by it.
pub struct Store {
    pool: SqlitePool,
    writer: tokio::sync::Mutex<()>,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            writer: tokio::sync::Mutex::new(()),
        }
    }

    pub async fn create_job(
        &self,
        command: String,
        timeout_seconds: i64,
        max_attempts: i64,
    ) -> Result<Job, StoreError> {
        if command.trim().is_empty() {
            return Err(StoreError::Validation("command must not be empty".into()));
        }
        if timeout_seconds <= 0 {
            return Err(StoreError::Validation(
                "timeout_seconds must be positive".into(),
            ));
        }
        if max_attempts <= 0 {
            return Err(StoreError::Validation(
                "max_attempts must be positive".into(),
            ));
        }

        let _guard = self.writer.lock().await;
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO jobs (status, command, created_at, timeout_seconds, attempts, max_attempts, artifact_urls)
            VALUES (?, ?, ?, ?, 0, ?, '[]')
            RETURNING id
            "#,
        )
        .bind(JobStatus::Queued.as_str())
        .bind(&command)
        .bind(now)
        .bind(timeout_seconds)
        .bind(max_attempts)
        .fetch_one(&self.pool)
        .await?;

        fetch_job(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::Internal(anyhow::anyhow!("job {id} vanished after insert")))
    }

    pub async fn get_job(&self, id: i64) -> Result<Job, StoreError> {
        fetch_job(&self.pool, id).await?.ok_or(StoreError::NotFound)
    }

    pub async fn list_jobs(
        &self,
        status: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Job>, StoreError> {
        let rows = match status {
            Some(s) => {
                sqlx::query_as::<_, Job>(
                    "SELECT * FROM jobs WHERE status = ? ORDER BY id DESC LIMIT ?",
                )
                .bind(s)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY id DESC LIMIT ?")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Atomically claims the oldest eligible queued job for `node_id` and
    /// mints a fresh lease. Returns `None` if the queue is empty.
    pub async fn claim_next_job(
        &self,
        node_id: &str,
        lease_seconds: i64,
    ) -> Result<Option<(Job, String)>, StoreError> {
        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;

        let candidate_id: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM jobs WHERE status = ? AND attempts < max_attempts ORDER BY id ASC LIMIT 1",
        )
        .bind(JobStatus::Queued.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(job_id) = candidate_id else {
            tx.commit().await?;
            return Ok(None);
        };

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, assigned_node_id = ?, started_at = ?, attempts = attempts + 1
            WHERE id = ?
            "#,
        )
        .bind(JobStatus::Running.as_str())
        .bind(node_id)
        .bind(now)
        .bind(job_id)
        .execute(&mut *tx)
        .await?;

        let lease_token = generate_lease_token();
        let lease_expires_at = now + chrono::Duration::seconds(lease_seconds);

        sqlx::query(
            "INSERT INTO leases (job_id, node_id, lease_token, lease_expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(job_id)
        .bind(node_id)
        .bind(&lease_token)
        .bind(lease_expires_at)
        .execute(&mut *tx)
        .await?;

        let job = fetch_job(&mut *tx, job_id).await?.ok_or_else(|| {
            StoreError::Internal(anyhow::anyhow!("job {job_id} vanished during claim"))
        })?;

        tx.commit().await?;
        Ok(Some((job, lease_token)))
    }

    pub async fn finish_job(
        &self,
        id: i64,
        node_id: &str,
        lease_token: &str,
        exit_code: i64,
        failure_reason: Option<String>,
    ) -> Result<Job, StoreError> {
        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;

        let job = fetch_job(&mut *tx, id).await?.ok_or(StoreError::NotFound)?;
        if job.status != JobStatus::Running.as_str() {
            return Err(StoreError::Conflict("job is not running"));
        }

        let lease = fetch_lease(&mut *tx, id)
            .await?
            .ok_or(StoreError::Conflict("job has no active lease"))?;
        check_lease(&lease, node_id, lease_token)?;

        let now = Utc::now();
        let status = if exit_code == 0 {
            JobStatus::Succeeded
        } else {
            JobStatus::Failed
        };

        sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, exit_code = ?, failure_reason = ?, finished_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(exit_code)
        .bind(&failure_reason)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM leases WHERE job_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let updated = fetch_job(&mut *tx, id).await?.ok_or_else(|| {
            StoreError::Internal(anyhow::anyhow!("job {id} vanished during finish"))
        })?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn append_logs(
        &self,
        id: i64,
        node_id: &str,
        lease_token: &str,
        text: &str,
    ) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;

        let job = fetch_job(&mut *tx, id).await?.ok_or(StoreError::NotFound)?;
        if job.status != JobStatus::Running.as_str() {
            return Err(StoreError::Conflict("job is not running"));
        }

        let lease = fetch_lease(&mut *tx, id)
            .await?
            .ok_or(StoreError::Conflict("job has no active lease"))?;
        check_lease(&lease, node_id, lease_token)?;

        sqlx::query("INSERT INTO logs (job_id, text, created_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(text)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn read_logs(&self, id: i64) -> Result<String, StoreError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound);
        }

        let chunks: Vec<String> =
            sqlx::query_scalar("SELECT text FROM logs WHERE job_id = ? ORDER BY id ASC")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
        Ok(chunks.concat())
    }

    pub async fn heartbeat_node(
        &self,
        node_id: &str,
        name: Option<String>,
        labels: Option<Labels>,
    ) -> Result<Node, StoreError> {
        let _guard = self.writer.lock().await;
        let now = Utc::now();

        let existing = sqlx::query_as::<_, Node>("SELECT * FROM nodes WHERE node_id = ?")
            .bind(node_id)
            .fetch_optional(&self.pool)
            .await?;

        let final_name = name.or_else(|| existing.as_ref().and_then(|n| n.name.clone()));
        let final_labels = match labels {
            Some(l) if !l.is_empty() => l,
            _ => existing.map(|n| n.labels.0).unwrap_or_default(),
        };

        sqlx::query(
            r#"
            INSERT INTO nodes (node_id, name, labels, last_seen_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(node_id) DO UPDATE SET
                name = excluded.name,
                labels = excluded.labels,
                last_seen_at = excluded.last_seen_at
            "#,
        )
        .bind(node_id)
        .bind(&final_name)
        .bind(sqlx::types::Json(&final_labels))
        .bind(now)
        .execute(&self.pool)
        .await?;

        sqlx::query_as::<_, Node>("SELECT * FROM nodes WHERE node_id = ?")
            .bind(node_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                StoreError::Internal(anyhow::anyhow!("node {node_id} vanished after upsert"))
            })
    }
}

fn check_lease(lease: &Lease, node_id: &str, lease_token: &str) -> Result<(), StoreError> {
    if lease.lease_expires_at <= Utc::now() {
        return Err(StoreError::Conflict("lease has expired"));
    }
    if lease.node_id != node_id || lease.lease_token != lease_token {
        return Err(StoreError::Conflict("job is owned by a different worker"));
    }
    Ok(())
}

async fn fetch_job<'e, E>(executor: E, id: i64) -> Result<Option<Job>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

async fn fetch_lease<'e, E>(executor: E, job_id: i64) -> Result<Option<Lease>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query_as::<_, Lease>("SELECT * FROM leases WHERE job_id = ?")
        .bind(job_id)
        .fetch_optional(executor)
        .await
}
