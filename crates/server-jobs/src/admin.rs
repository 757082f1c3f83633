// crates/server-jobs/src/admin.rs
//! Read-only aggregation over a registry snapshot.
//!
//! Every view is computed from a single `JobRegistry::list()` call, so counts
//! and job lists inside one response always agree with each other.

use serde::Serialize;

use super::registry::JobRegistry;
use super::types::{JobRecord, JobStatus};

/// Number of jobs shown in the dashboard's recent list.
pub const RECENT_TASKS_LIMIT: usize = 10;

/// Job count per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn from_records(records: &[JobRecord]) -> Self {
        records.iter().fold(Self::default(), |mut counts, record| {
            match record.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Running => counts.running += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.pending + self.running + self.completed + self.failed
    }
}

/// Status counts plus their total, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

/// GET /admin/dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub tasks: TaskStats,
    pub recent_tasks: Vec<JobRecord>,
}

/// GET /admin/tasks/summary payload.
#[derive(Debug, Clone, Serialize)]
pub struct TasksSummary {
    pub total_tasks: usize,
    pub status_breakdown: StatusCounts,
    pub tasks: Vec<JobRecord>,
}

/// The `limit` most recently created jobs, newest first.
///
/// Jobs created at the same instant are ordered by submission, later first.
pub fn recent(mut records: Vec<JobRecord>, limit: usize) -> Vec<JobRecord> {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.seq.cmp(&a.seq))
    });
    records.truncate(limit);
    records
}

pub fn dashboard(records: Vec<JobRecord>) -> Dashboard {
    let counts = StatusCounts::from_records(&records);
    Dashboard {
        tasks: TaskStats {
            total: records.len(),
            counts,
        },
        recent_tasks: recent(records, RECENT_TASKS_LIMIT),
    }
}

pub fn summary(records: Vec<JobRecord>) -> TasksSummary {
    TasksSummary {
        total_tasks: records.len(),
        status_breakdown: StatusCounts::from_records(&records),
        tasks: records,
    }
}

impl JobRegistry {
    /// Dashboard over the current snapshot.
    pub fn dashboard(&self) -> Dashboard {
        dashboard(self.list())
    }

    /// Summary over the current snapshot.
    pub fn summary(&self) -> TasksSummary {
        summary(self.list())
    }
}
