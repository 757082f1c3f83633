use std::time::Duration;

use assert_json_diff::assert_json_include;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use task_caching_server::{create_app, AppState};
use tower::ServiceExt;

/// Helper to make a request to the app.
async fn request(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = if let Some(json) = body {
        builder = builder.header("content-type", "application/json");
        Body::from(serde_json::to_string(&json).unwrap())
    } else {
        Body::empty()
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn submit(app: &axum::Router) -> String {
    let (status, json) = request(app.clone(), "POST", "/api/tasks/report", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    json["task_id"].as_str().unwrap().to_string()
}

#[tokio::test(start_paused = true)]
async fn report_task_lifecycle() {
    let app = create_app(AppState::new(Duration::from_secs(3)));

    let (status, json) = request(app.clone(), "POST", "/api/tasks/report", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "pending");
    let id = json["task_id"].as_str().unwrap().to_string();

    let (status, task) = request(app.clone(), "GET", &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_json_include!(actual: task.clone(), expected: json!({"id": id, "type": "report"}));
    // The handler releases the job once its response is built, so by the time
    // this GET runs the spawned runner may or may not have been scheduled.
    // Either non-terminal state is correct; the 3s report cannot have finished.
    let early = task["status"].as_str().unwrap();
    assert!(early == "pending" || early == "running", "unexpected status {early}");
    assert!(task.get("result").is_none());
    assert!(task.get("error").is_none());

    tokio::time::sleep(Duration::from_secs(4)).await;

    let (status, task) = request(app.clone(), "GET", &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "completed");
    assert_eq!(task["result"]["rows_processed"], 15000);
    assert_eq!(task["result"]["report_url"], format!("/reports/{id}.pdf"));
    assert!(task.get("error").is_none());
    assert!(task["started_at"].is_string());
    assert!(task["finished_at"].is_string());
}

#[tokio::test]
async fn unknown_task_is_404() {
    let app = create_app(AppState::new(Duration::from_secs(3)));

    let (status, json) = request(app, "GET", "/api/tasks/nonexistent-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Task not found");
}

#[tokio::test]
async fn submit_without_body_uses_empty_params() {
    let app = create_app(AppState::new(Duration::from_secs(3)));

    let (status, json) = request(app, "POST", "/api/tasks/report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "pending");
}

#[tokio::test]
async fn list_counts_every_submission() {
    let app = create_app(AppState::new(Duration::from_secs(3)));

    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(submit(&app).await);
    }

    let (status, json) = request(app, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 4);
    let listed: Vec<String> = json["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(listed, ids);
}

#[tokio::test(start_paused = true)]
async fn dashboard_shows_ten_newest() {
    let app = create_app(AppState::new(Duration::from_secs(3)));

    let mut ids = Vec::new();
    for _ in 0..15 {
        ids.push(submit(&app).await);
    }

    let (status, dash) = request(app.clone(), "GET", "/api/admin/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);

    let recent: Vec<String> = dash["recent_tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect();
    let expected: Vec<String> = ids.iter().rev().take(10).cloned().collect();
    assert_eq!(recent, expected);
    assert_eq!(dash["tasks"]["total"], 15);

    let (_, summary) = request(app, "GET", "/api/admin/tasks/summary", None).await;
    let counts = &dash["tasks"];
    let sum: u64 = ["pending", "running", "completed", "failed"]
        .iter()
        .map(|s| counts[*s].as_u64().unwrap())
        .sum();
    assert_eq!(sum, summary["total_tasks"].as_u64().unwrap());
}

#[tokio::test(start_paused = true)]
async fn admin_summary_after_completion() {
    let app = create_app(AppState::new(Duration::from_secs(3)));
    for _ in 0..3 {
        submit(&app).await;
    }

    tokio::time::sleep(Duration::from_secs(4)).await;

    let (status, summary) = request(app.clone(), "GET", "/api/admin/tasks/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        summary["status_breakdown"],
        json!({"pending": 0, "running": 0, "completed": 3, "failed": 0})
    );
    assert_eq!(summary["total_tasks"], 3);

    let (_, health) = request(app, "GET", "/health", None).await;
    assert_eq!(health["active_tasks"], 3);
}
