// crates/server/src/routes/info.rs
//! Root endpoint describing the API.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// GET / - API name, version and entry points.
pub async fn root() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "Welcome to Task Caching API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: BTreeMap::from([
            ("tasks", "/api/tasks"),
            ("admin", "/api/admin/dashboard"),
            ("stream", "/api/tasks/stream"),
            ("health", "/health"),
        ]),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(root))
}
