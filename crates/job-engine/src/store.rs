//! Job persistence behind a trait so the orchestrator never assumes a
//! concrete backing store.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::job::{Job, JobStatus};

/// Storage for tracked jobs.
///
/// `update` is the single write path for in-flight jobs: mutations are
/// applied under the store's own synchronization, so concurrent progress
/// reports and deletes never interleave mid-mutation.
pub trait JobStore: Send + Sync {
    fn insert(&self, job: Job);

    /// Snapshot of one job.
    fn get(&self, id: Uuid) -> Option<Job>;

    /// Apply `f` to the job if it still exists. Returns false when the
    /// job is gone, which tells a render worker to stop reporting.
    fn update(&self, id: Uuid, f: &mut dyn FnMut(&mut Job)) -> bool;

    fn remove(&self, id: Uuid) -> Option<Job>;

    /// Status snapshots of every tracked job.
    fn list(&self) -> Vec<JobStatus>;
}

/// In-memory store. Job history does not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for MemoryJobStore {
    fn insert(&self, job: Job) {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.insert(job.id, job);
    }

    fn get(&self, id: Uuid) -> Option<Job> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(&id).cloned()
    }

    fn update(&self, id: Uuid, f: &mut dyn FnMut(&mut Job)) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        match jobs.get_mut(&id) {
            Some(job) => {
                f(job);
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: Uuid) -> Option<Job> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.remove(&id)
    }

    fn list(&self) -> Vec<JobStatus> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.values().map(Job::status).collect()
    }
}
