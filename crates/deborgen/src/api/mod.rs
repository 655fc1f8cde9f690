pub mod models;

use crate::ids::parse_job_id;
use crate::jobs::{Lifecycle, StoreError};
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use models::{
    AppendLogsRequest, AssignmentView, ClaimQuery, CreateJobRequest, ErrorBody, FinishRequest,
    HeartbeatRequest, JobView, ListJobsQuery, ListJobsResponse, LogsResponse, NodeView,
};

#[derive(Clone)]
pub struct ApiState {
    pub lifecycle: Lifecycle,
    pub token: Option<String>,
}

pub fn router(state: ApiState) -> Router {
    let protected = Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/next", get(claim_next))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id/finish", post(finish_job))
        .route("/jobs/:id/logs", get(read_logs).post(append_logs))
        .route("/nodes/:node_id/heartbeat", post(heartbeat))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
}

async fn auth(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    let Some(token) = &state.token else {
        return next.run(req).await;
    };

    let expected = format!("Bearer {token}");
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);

    if authorized {
        next.run(req).await
    } else {
        error_response(StatusCode::UNAUTHORIZED, "missing or invalid bearer token")
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_job(
    State(state): State<ApiState>,
    Json(body): Json<CreateJobRequest>,
) -> Result<Response, Response> {
    let job = state
        .lifecycle
        .create_job(
            body.command,
            body.timeout_seconds.unwrap_or(3600),
            body.max_attempts.unwrap_or(1),
        )
        .await
        .map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(JobView::from(&job))).into_response())
}

async fn list_jobs(
    State(state): State<ApiState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Response, Response> {
    if let Some(limit) = query.limit {
        if !(1..=1000).contains(&limit) {
            return Err(error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "limit must be between 1 and 1000",
            ));
        }
    }
    let limit = query.limit.unwrap_or(i64::MAX);
    let jobs = state
        .lifecycle
        .list_jobs(query.status.as_deref(), limit)
        .await
        .map_err(map_err)?;
    Ok(Json(ListJobsResponse {
        jobs: jobs.iter().map(JobView::from).collect(),
    })
    .into_response())
}

async fn get_job(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let job_id = parse_job_id(&id).ok_or_else(not_found)?;
    let job = state.lifecycle.get_job(job_id).await.map_err(map_err)?;
    Ok(Json(JobView::from(&job)).into_response())
}

async fn claim_next(
    State(state): State<ApiState>,
    Query(query): Query<ClaimQuery>,
) -> Result<Response, Response> {
    match state
        .lifecycle
        .claim_next_job(&query.node_id)
        .await
        .map_err(map_err)?
    {
        Some((job, lease_token)) => Ok((
            StatusCode::OK,
            Json(AssignmentView {
                job: JobView::from(&job),
                lease_token,
            }),
        )
            .into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

async fn finish_job(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(body): Json<FinishRequest>,
) -> Result<Response, Response> {
    let job_id = parse_job_id(&id).ok_or_else(not_found)?;
    let job = state
        .lifecycle
        .finish_job(
            job_id,
            &body.node_id,
            &body.lease_token,
            body.exit_code,
            body.failure_reason,
        )
        .await
        .map_err(map_err)?;
    Ok(Json(JobView::from(&job)).into_response())
}

async fn append_logs(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(body): Json<AppendLogsRequest>,
) -> Result<Response, Response> {
    let job_id = parse_job_id(&id).ok_or_else(not_found)?;
    state
        .lifecycle
        .append_logs(job_id, &body.node_id, &body.lease_token, &body.text)
        .await
        .map_err(map_err)?;
    Ok(Json(serde_json::json!({ "status": "ok" })).into_response())
}

async fn read_logs(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let job_id = parse_job_id(&id).ok_or_else(not_found)?;
    let text = state.lifecycle.read_logs(job_id).await.map_err(map_err)?;
    Ok(Json(LogsResponse { text }).into_response())
}

async fn heartbeat(
    State(state): State<ApiState>,
    Path(node_id): Path<String>,
    Json(body): Json<HeartbeatRequest>,
) -> Result<Response, Response> {
    let node = state
        .lifecycle
        .heartbeat_node(&node_id, body.name, body.labels)
        .await
        .map_err(map_err)?;
    Ok(Json(NodeView::from(&node)).into_response())
}

fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "job not found")
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message.to_string() })).into_response()
}

fn map_err(err: StoreError) -> Response {
    match err {
        StoreError::NotFound => error_response(StatusCode::NOT_FOUND, "job not found"),
        StoreError::Conflict(msg) => error_response(StatusCode::CONFLICT, msg),
        StoreError::Validation(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        StoreError::Internal(e) => {
            eprintln!("[api] internal error: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}
