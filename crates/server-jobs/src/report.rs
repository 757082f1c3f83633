// crates/server-jobs/src/report.rs
//! Report generation, the unit of work behind `POST /tasks/report`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::JobId;

/// Job type tag for report jobs.
pub const REPORT_JOB_TYPE: &str = "report";

/// Rows reported by every generated report.
pub const REPORT_ROWS_PROCESSED: u64 = 15_000;

/// Result payload of a completed report job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResult {
    pub report_url: String,
    pub rows_processed: u64,
}

impl ReportResult {
    pub fn for_job(id: JobId) -> Self {
        Self {
            report_url: format!("/reports/{id}.pdf"),
            rows_processed: REPORT_ROWS_PROCESSED,
        }
    }
}

/// Simulate a long-running report build.
///
/// The delay is the only suspension point; other jobs and requests keep
/// making progress while it elapses.
pub async fn generate_report(
    id: JobId,
    params: Map<String, Value>,
    delay: Duration,
) -> Result<Value, String> {
    tracing::debug!(
        job_id = %id,
        param_count = params.len(),
        delay_ms = delay.as_millis() as u64,
        "Generating report"
    );
    tokio::time::sleep(delay).await;

    serde_json::to_value(ReportResult::for_job(id))
        .map_err(|e| format!("failed to encode report result: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_report_result_for_job() {
        let id = Uuid::new_v4();
        let result = ReportResult::for_job(id);
        assert_eq!(result.report_url, format!("/reports/{id}.pdf"));
        assert_eq!(result.rows_processed, 15_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_report_waits_for_delay() {
        let id = Uuid::new_v4();
        let started = tokio::time::Instant::now();

        let value = generate_report(id, Map::new(), Duration::from_secs(3))
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_secs(3));
        let result: ReportResult = serde_json::from_value(value).unwrap();
        assert_eq!(result, ReportResult::for_job(id));
    }
}
