// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use task_caching_jobs::{JobRegistry, JobRunner};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// In-memory job store. Lives as long as the process.
    pub registry: Arc<JobRegistry>,
    /// Spawns background work against `registry`.
    pub runner: JobRunner,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(report_delay: Duration) -> Arc<Self> {
        Self::with_registry(Arc::new(JobRegistry::new()), report_delay)
    }

    /// Create around an externally owned registry.
    pub fn with_registry(registry: Arc<JobRegistry>, report_delay: Duration) -> Arc<Self> {
        let runner = JobRunner::new(Arc::clone(&registry)).with_report_delay(report_delay);
        Arc::new(Self {
            start_time: Instant::now(),
            registry,
            runner,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
