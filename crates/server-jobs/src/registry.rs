// crates/server-jobs/src/registry.rs
//! Process-wide store of job records.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::types::{JobId, JobRecord};

/// Authoritative in-memory map from job id to job record.
///
/// Shared as `Arc<JobRegistry>` between request handlers and job runners.
/// Entries are never removed. Every mutation happens under the write lock,
/// so readers only ever see whole records.
pub struct JobRegistry {
    next_seq: AtomicU64,
    jobs: RwLock<HashMap<JobId, JobRecord>>,
    events_tx: broadcast::Sender<JobRecord>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(256);
        Self {
            next_seq: AtomicU64::new(0),
            jobs: RwLock::new(HashMap::new()),
            events_tx,
        }
    }

    /// Insert a new pending job of the given type and return its id.
    pub fn submit(&self, job_type: impl Into<String>) -> JobId {
        let job_type = job_type.into();
        let record = {
            let mut jobs = self.write_jobs();
            let id = loop {
                let candidate = Uuid::new_v4();
                if !jobs.contains_key(&candidate) {
                    break candidate;
                }
            };
            // Sequence and timestamp are taken under the lock so both follow insertion order.
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            let record = JobRecord::new(id, job_type, seq, Utc::now());
            jobs.insert(id, record.clone());
            record
        };

        tracing::debug!(job_id = %record.id, job_type = %record.job_type, "Job submitted");
        // Ignore send errors (no subscribers is fine).
        let _ = self.events_tx.send(record.clone());
        record.id
    }

    /// Snapshot of a single job, or `None` if the id was never submitted.
    pub fn get(&self, id: JobId) -> Option<JobRecord> {
        self.read_jobs().get(&id).cloned()
    }

    /// Snapshot of every job, in submission order.
    pub fn list(&self) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = self.read_jobs().values().cloned().collect();
        records.sort_by_key(|r| r.seq);
        records
    }

    /// Number of jobs ever submitted.
    pub fn len(&self) -> usize {
        self.read_jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `mutate` to the stored record as one atomic read-modify-write.
    ///
    /// Returns `None` (and leaves the map untouched) when the id is unknown.
    /// Subscribers are notified only if the record actually changed.
    pub fn update<F, R>(&self, id: JobId, mutate: F) -> Option<R>
    where
        F: FnOnce(&mut JobRecord) -> R,
    {
        let (out, changed) = {
            let mut jobs = self.write_jobs();
            let Some(record) = jobs.get_mut(&id) else {
                tracing::warn!(job_id = %id, "Update for unknown job ignored");
                return None;
            };
            let before = record.clone();
            let out = mutate(record);
            let changed = (*record != before).then(|| record.clone());
            (out, changed)
        };

        if let Some(snapshot) = changed {
            let _ = self.events_tx.send(snapshot);
        }
        Some(out)
    }

    /// Subscribe to record snapshots emitted after every insert and every
    /// update that changed a record.
    pub fn subscribe(&self) -> broadcast::Receiver<JobRecord> {
        self.events_tx.subscribe()
    }

    fn read_jobs(&self) -> RwLockReadGuard<'_, HashMap<JobId, JobRecord>> {
        self.jobs.read().unwrap_or_else(|poisoned| {
            tracing::error!("RwLock poisoned reading jobs map; recovering");
            poisoned.into_inner()
        })
    }

    fn write_jobs(&self) -> RwLockWriteGuard<'_, HashMap<JobId, JobRecord>> {
        self.jobs.write().unwrap_or_else(|poisoned| {
            tracing::error!("RwLock poisoned writing jobs map; recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
