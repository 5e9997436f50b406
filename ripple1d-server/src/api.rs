use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;

use ripple1d_common::RippleError;

use crate::job::Job;
use crate::process::{validate_params, ProcessRegistry};
use crate::store::JobStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JobStore>,
    pub registry: Arc<ProcessRegistry>,
    next_job_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(store: Arc<JobStore>, registry: Arc<ProcessRegistry>) -> AppState {
        AppState { store, registry, next_job_id: Arc::new(AtomicU64::new(1)) }
    }

    fn allocate_job_id(&self) -> String {
        let n = self.next_job_id.fetch_add(1, Ordering::SeqCst);
        let pid = std::process::id();
        format!("job-{pid}-{n}")
    }
}

fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Builds the full router for spec §4.8's endpoint table.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/processes/:name/execution", post(enqueue_execution))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job).delete(delete_job))
        .route("/jobs/:id/logs", get(get_job_logs))
        .route("/jobs/:id/results", get(get_job_results))
        .route("/jobs/:id/metadata", get(get_job_metadata))
        .with_state(state)
}

struct ApiError(RippleError);

impl From<RippleError> for ApiError {
    fn from(e: RippleError) -> ApiError {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RippleError::JobNotFound(_) | RippleError::UnknownProcess(_) => StatusCode::NOT_FOUND,
            RippleError::BadRequestParameters { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({"error": self.0.to_string()}))).into_response()
    }
}

async fn ping() -> &'static str {
    "pong"
}

async fn enqueue_execution(State(state): State<AppState>, Path(name): Path<String>, Json(params): Json<serde_json::Value>) -> Result<Response, ApiError> {
    let process = state.registry.get(&name).ok_or_else(|| RippleError::UnknownProcess(name.clone()))?;
    validate_params(process, &params)?;

    let job_id = state.allocate_job_id();
    let job = Job::new(job_id, name, params, &now_iso8601());
    state.store.save(&job)?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"jobID": job.job_id, "status": "accepted"}))).into_response())
}

async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let jobs = state.store.list()?;
    Ok(Json(jobs.iter().map(Job::metadata).collect()))
}

#[derive(Deserialize)]
struct JobQuery {
    #[serde(default)]
    tb: Option<String>,
}

async fn get_job(State(state): State<AppState>, Path(id): Path<String>, Query(query): Query<JobQuery>) -> Result<Json<serde_json::Value>, ApiError> {
    let include_traceback = match query.tb.as_deref() {
        None => false,
        Some("true") => true,
        Some("false") => false,
        Some(_) => return Err(ApiError(RippleError::BadRequestParameters { unexpected: vec!["tb".to_string()], missing: Vec::new() })),
    };
    let job = state.store.load(&id)?;
    let mut value = job.metadata();
    value["error"] = serde_json::json!(job.error);
    if include_traceback {
        value["traceback"] = serde_json::json!(job.traceback);
    }
    Ok(Json(value))
}

async fn get_job_logs(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<String>>, ApiError> {
    let job = state.store.load(&id)?;
    Ok(Json(job.logs))
}

async fn get_job_results(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let job = state.store.load(&id)?;
    Ok(Json(job.result.unwrap_or(serde_json::Value::Null)))
}

async fn get_job_metadata(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let job = state.store.load(&id)?;
    Ok(Json(serde_json::json!({"jobID": job.job_id, "processID": job.process_id, "params": job.params, "created": job.created})))
}

async fn delete_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let mut job = state.store.load(&id)?;
    if job.status.is_terminal() {
        return Err(ApiError(RippleError::Other(format!("job {id} is already terminal and cannot be revoked"))));
    }
    job.status = crate::job::JobStatus::Dismissed;
    job.updated = now_iso8601();
    state.store.save(&job)?;
    Ok(Json(serde_json::json!({"jobID": job.job_id, "status": "dismissed"})))
}

#[cfg(test)]
mod test {
    use super::*;

    fn state() -> AppState {
        let dir = std::env::temp_dir().join(format!(
            "ripple1d-api-test-{}-{}",
            std::process::id(),
            std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap().as_nanos()
        ));
        let store = Arc::new(JobStore::new(dir).unwrap());
        AppState::new(store, Arc::new(ProcessRegistry::new()))
    }

    #[tokio::test]
    async fn enqueue_execution_rejects_unknown_process() {
        let state = state();
        let result = enqueue_execution(State(state), Path("does_not_exist".to_string()), Json(serde_json::json!({}))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn enqueue_execution_accepts_noop() {
        let state = state();
        let response = enqueue_execution(State(state), Path("noop".to_string()), Json(serde_json::json!({}))).await;
        assert!(response.is_ok());
    }
}
