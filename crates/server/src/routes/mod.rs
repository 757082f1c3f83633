//! API route handlers for the task caching server.

pub mod admin;
pub mod health;
pub mod info;
pub mod tasks;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined router.
///
/// Routes:
/// - GET  / - API info
/// - GET  /health - Health check
/// - POST /api/tasks/report - Submit a report task
/// - GET  /api/tasks - List all tasks
/// - GET  /api/tasks/stream - SSE stream of task changes
/// - GET  /api/tasks/{task_id} - Get a single task
/// - GET  /api/admin/dashboard - Status counts and the ten newest tasks
/// - GET  /api/admin/tasks/summary - Status counts and every task
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(info::router())
        .merge(health::router())
        .nest("/api", tasks::router().merge(admin::router()))
        .with_state(state)
}
