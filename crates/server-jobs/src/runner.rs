// crates/server-jobs/src/runner.rs
//! Spawns job work in the background and drives each job to a terminal state.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::oneshot;
use tokio::task::JoinError;

use super::registry::JobRegistry;
use super::report::{self, REPORT_JOB_TYPE};
use super::types::{JobId, JobStatus, JobTicket};

/// How long a report job takes unless configured otherwise.
pub const DEFAULT_REPORT_DELAY: Duration = Duration::from_secs(3);

/// Submits jobs to a shared `JobRegistry` and runs their work on the tokio runtime.
///
/// Cheap to clone; every clone writes to the same registry.
#[derive(Clone)]
pub struct JobRunner {
    registry: Arc<JobRegistry>,
    report_delay: Duration,
}

impl JobRunner {
    /// Create a runner writing to `registry`, with the default report delay.
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self {
            registry,
            report_delay: DEFAULT_REPORT_DELAY,
        }
    }

    pub fn with_report_delay(mut self, delay: Duration) -> Self {
        self.report_delay = delay;
        self
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn report_delay(&self) -> Duration {
        self.report_delay
    }

    /// Submit a new background job.
    ///
    /// The record is inserted as pending before this returns. The closure `work`
    /// receives the job id and runs on a detached task once the returned ticket
    /// is started or dropped. `Err(message)` (or a panic) fails the job.
    pub fn submit<F, Fut>(&self, job_type: impl Into<String>, work: F) -> JobTicket
    where
        F: FnOnce(JobId) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, String>> + Send + 'static,
    {
        let id = self.registry.submit(job_type);
        let (start_tx, start_rx) = oneshot::channel::<()>();

        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            // A started or dropped ticket both release the job.
            let _ = start_rx.await;
            run(&registry, id, work).await;
        });

        JobTicket::new(id, start_tx)
    }

    /// Submit a report job. The parameter payload is passed through to the work.
    pub fn submit_report(&self, params: Map<String, Value>) -> JobTicket {
        let delay = self.report_delay;
        self.submit(REPORT_JOB_TYPE, move |id| {
            report::generate_report(id, params, delay)
        })
    }
}

/// Drive job `id` through running to completed or failed.
///
/// The work closure is both called and awaited on its own task, so a panic
/// at either point is recorded as a failure instead of leaving the job stuck
/// in running.
pub async fn run<F, Fut>(registry: &JobRegistry, id: JobId, work: F)
where
    F: FnOnce(JobId) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Value, String>> + Send + 'static,
{
    match registry.update(id, |job| job.start(Utc::now())) {
        Some(Ok(())) => tracing::info!(job_id = %id, "Job running"),
        Some(Err(e)) => {
            tracing::warn!(job_id = %id, error = %e, "Job not started");
            return;
        }
        None => return,
    }

    let outcome = match tokio::spawn(async move { work(id).await }).await {
        Ok(outcome) => outcome,
        Err(e) => Err(describe_join_error(e)),
    };

    let finished = registry.update(id, move |job| {
        let now = Utc::now();
        let transitioned = match outcome {
            Ok(result) => job.complete(result, now),
            Err(error) => job.fail(error, now),
        };
        transitioned.map(|()| (job.status, job.error.clone()))
    });

    match finished {
        Some(Ok((JobStatus::Failed, error))) => {
            tracing::warn!(job_id = %id, error = ?error, "Job failed");
        }
        Some(Ok((status, _))) => tracing::info!(job_id = %id, %status, "Job finished"),
        Some(Err(e)) => tracing::error!(job_id = %id, error = %e, "Job outcome dropped"),
        None => {}
    }
}

fn describe_join_error(err: JoinError) -> String {
    if !err.is_panic() {
        return format!("job aborted: {err}");
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("job panicked: {message}")
}
