// crates/server-jobs/src/lib.rs
//! In-memory background job system for the task caching service.
//!
//! Provides:
//! - `JobRegistry` — process-wide store of job records
//! - `JobRunner` — spawns detached work and drives each job to a terminal state
//! - `JobTicket` — submitter's handle that releases a job to its runner
//! - `admin` — read-only dashboard and summary views over a registry snapshot

pub mod admin;
pub mod registry;
pub mod report;
pub mod runner;
pub mod types;

pub use admin::{Dashboard, StatusCounts, TaskStats, TasksSummary, RECENT_TASKS_LIMIT};
pub use registry::JobRegistry;
pub use report::{ReportResult, REPORT_JOB_TYPE};
pub use runner::{JobRunner, DEFAULT_REPORT_DELAY};
pub use types::{JobId, JobRecord, JobStatus, JobTicket, TransitionError};
