// Job Queue Port (Interface)

use crate::domain::{JobId, JobState, QueuedJob};
use crate::error::Result;
use async_trait::async_trait;

/// Queue transport holding delete jobs between enqueue and execution
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Append a new job
    async fn push(&self, job: &QueuedJob) -> Result<()>;

    /// Pop the oldest ENQUEUED job whose backoff has elapsed
    ///
    /// The returned job is already marked EXECUTING so two workers never
    /// receive the same job.
    async fn pop_next(&self, now_millis: i64) -> Result<Option<QueuedJob>>;

    /// Persist the new state of a job
    async fn update(&self, job: &QueuedJob) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<QueuedJob>>;

    /// Count jobs by state
    async fn count_by_state(&self, state: JobState) -> Result<i64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock queue keeping pushed jobs in memory (no backoff handling)
    #[derive(Default)]
    pub struct MockJobQueue {
        jobs: Arc<Mutex<Vec<QueuedJob>>>,
    }

    impl MockJobQueue {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn jobs(&self) -> Vec<QueuedJob> {
            self.jobs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobQueue for MockJobQueue {
        async fn push(&self, job: &QueuedJob) -> Result<()> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(())
        }

        async fn pop_next(&self, now_millis: i64) -> Result<Option<QueuedJob>> {
            let mut jobs = self.jobs.lock().unwrap();
            match jobs.iter_mut().find(|j| j.state == JobState::Enqueued) {
                Some(job) => {
                    job.start(now_millis)?;
                    Ok(Some(job.clone()))
                }
                None => Ok(None),
            }
        }

        async fn update(&self, job: &QueuedJob) -> Result<()> {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(existing) = jobs.iter_mut().find(|j| j.id == job.id) {
                *existing = job.clone();
            }
            Ok(())
        }

        async fn find_by_id(&self, id: &JobId) -> Result<Option<QueuedJob>> {
            Ok(self.jobs.lock().unwrap().iter().find(|j| &j.id == id).cloned())
        }

        async fn count_by_state(&self, state: JobState) -> Result<i64> {
            Ok(self
                .jobs
                .lock()
                .unwrap()
                .iter()
                .filter(|j| j.state == state)
                .count() as i64)
        }
    }
}
