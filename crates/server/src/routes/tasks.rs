// crates/server/src/routes/tasks.rs
//! API routes for background tasks.
//!
//! - POST /tasks/report — Submit a report job
//! - GET /tasks — List all tasks
//! - GET /tasks/{task_id} — Get a single task
//! - GET /tasks/stream — SSE stream of task changes

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use task_caching_jobs::{JobId, JobRecord, JobStatus};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Response for POST /api/tasks/report
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub task_id: JobId,
    pub status: JobStatus,
}

/// Response for GET /api/tasks
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub total: usize,
    pub tasks: Vec<JobRecord>,
}

/// Parse the submit body. Empty means no parameters; anything else must be
/// a JSON object.
fn parse_params(body: &[u8]) -> ApiResult<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(params)) => Ok(params),
        Ok(_) => Err(ApiError::BadRequest(
            "Task parameters must be a JSON object".to_string(),
        )),
        Err(e) => Err(ApiError::BadRequest(format!("Invalid JSON body: {e}"))),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/tasks/report — Create a new report generation task.
///
/// Returns as soon as the task is recorded; the report is built in the background.
async fn create_report(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<SubmitResponse>> {
    let params = parse_params(&body)?;
    let ticket = state.runner.submit_report(params);
    let response = SubmitResponse {
        task_id: ticket.id,
        status: JobStatus::Pending,
    };
    tracing::info!(task_id = %ticket.id, "Report task submitted");

    ticket.start();
    Ok(Json(response))
}

/// GET /api/tasks/{task_id} — Current state of one task.
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    Uuid::parse_str(&task_id)
        .ok()
        .and_then(|id| state.registry.get(id))
        .map(Json)
        .ok_or_else(|| ApiError::TaskNotFound(task_id))
}

/// GET /api/tasks — List all tasks.
async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<TaskListResponse> {
    let tasks = state.registry.list();
    Json(TaskListResponse {
        total: tasks.len(),
        tasks,
    })
}

/// GET /api/tasks/stream — SSE stream of task snapshots, one per change.
async fn stream_tasks(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.registry.subscribe();

    let stream = async_stream::stream! {
        let mut rx = rx;
        loop {
            match rx.recv().await {
                Ok(record) => {
                    let json = serde_json::to_string(&record).unwrap_or_default();
                    yield Ok(Event::default().event("task").data(json));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Task stream subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Build the tasks router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/report", post(create_report))
        .route("/tasks/stream", get(stream_tasks))
        .route("/tasks/{task_id}", get(get_task))
}
