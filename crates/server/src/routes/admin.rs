// crates/server/src/routes/admin.rs
//! Admin views over the task registry.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use task_caching_jobs::{Dashboard, TasksSummary};

use crate::state::AppState;

/// GET /api/admin/dashboard — Status counts plus the ten newest tasks.
async fn dashboard(State(state): State<Arc<AppState>>) -> Json<Dashboard> {
    Json(state.registry.dashboard())
}

/// GET /api/admin/tasks/summary — Status counts plus every task.
async fn tasks_summary(State(state): State<Arc<AppState>>) -> Json<TasksSummary> {
    Json(state.registry.summary())
}

/// Build the admin router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/tasks/summary", get(tasks_summary))
}
