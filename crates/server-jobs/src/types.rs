// crates/server-jobs/src/types.rs
//! Types for the background job system.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Unique identifier for a job (random 128-bit UUID).
pub type JobId = Uuid;

/// Status of a background job.
///
/// ```text
/// pending -> running -> completed
///                   \-> failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Completed and failed jobs never change status again.
    pub fn is_terminal(self) -> bool {
        match self {
            JobStatus::Pending | JobStatus::Running => false,
            JobStatus::Completed | JobStatus::Failed => true,
        }
    }

    /// Whether `self -> next` is an edge of the job state machine.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Pending, JobStatus::Running) => true,
            (JobStatus::Running, JobStatus::Completed) => true,
            (JobStatus::Running, JobStatus::Failed) => true,
            (JobStatus::Pending, _)
            | (JobStatus::Running, _)
            | (JobStatus::Completed, _)
            | (JobStatus::Failed, _) => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status change. The record is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("invalid job transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}

/// A tracked job, as stored in the registry and returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub id: JobId,
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Registry insertion order. Breaks `created_at` ties.
    #[serde(skip)]
    pub seq: u64,
}

impl JobRecord {
    pub(crate) fn new(id: JobId, job_type: String, seq: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            job_type,
            status: JobStatus::Pending,
            created_at,
            started_at: None,
            finished_at: None,
            result: None,
            error: None,
            seq,
        }
    }

    /// Move to `Running` and stamp `started_at`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobStatus::Running)?;
        self.started_at = Some(now.max(self.created_at));
        Ok(())
    }

    /// Move to `Completed` with the work's result.
    pub fn complete(
        &mut self,
        result: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.transition(JobStatus::Completed)?;
        self.result = Some(result);
        self.stamp_finished(now);
        Ok(())
    }

    /// Move to `Failed` with a human-readable description.
    pub fn fail(
        &mut self,
        error: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(error.into());
        self.stamp_finished(now);
        Ok(())
    }

    fn transition(&mut self, to: JobStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(to) {
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    // Wall clock can step backwards; never let finished_at precede started_at.
    fn stamp_finished(&mut self, now: DateTime<Utc>) {
        let floor = self.started_at.unwrap_or(self.created_at);
        self.finished_at = Some(now.max(floor));
    }
}

/// Handle returned on submission. The job's runner waits until the ticket is
/// started or dropped, so the submitter always sees the job id first.
#[derive(Debug)]
pub struct JobTicket {
    pub id: JobId,
    start_tx: Option<oneshot::Sender<()>>,
}

impl JobTicket {
    pub(crate) fn new(id: JobId, start_tx: oneshot::Sender<()>) -> Self {
        Self {
            id,
            start_tx: Some(start_tx),
        }
    }

    /// Release the job to its runner. Returns true if the runner was still waiting.
    pub fn start(mut self) -> bool {
        if let Some(tx) = self.start_tx.take() {
            tx.send(()).is_ok()
        } else {
            false
        }
    }
}
