// In-memory JobQueue implementation

use async_trait::async_trait;
use codeintel_core::domain::{JobId, JobState, QueuedJob};
use codeintel_core::error::{AppError, Result};
use codeintel_core::port::JobQueue;
use std::collections::VecDeque;
use tokio::sync::Mutex;
use tracing::debug;

/// FIFO queue of delete jobs living for the lifetime of the process
///
/// Terminal jobs stay in the queue so their status can still be queried;
/// `pop_next` only ever hands out ENQUEUED jobs whose backoff has elapsed.
#[derive(Default)]
pub struct InMemoryJobQueue {
    jobs: Mutex<VecDeque<QueuedJob>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs held, terminal ones included
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn push(&self, job: &QueuedJob) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        if jobs.iter().any(|j| j.id == job.id) {
            return Err(AppError::Queue(format!("job {} already queued", job.id)));
        }
        jobs.push_back(job.clone());
        debug!(job_id = %job.id, uri = %job.uri(), depth = jobs.len(), "Job pushed");
        Ok(())
    }

    async fn pop_next(&self, now_millis: i64) -> Result<Option<QueuedJob>> {
        let mut jobs = self.jobs.lock().await;
        let ready = jobs.iter_mut().find(|j| {
            j.state == JobState::Enqueued && j.not_before.map_or(true, |t| t <= now_millis)
        });

        match ready {
            Some(job) => {
                job.start(now_millis)?;
                Ok(Some(job.clone()))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, job: &QueuedJob) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        match jobs.iter_mut().find(|j| j.id == job.id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("job {}", job.id))),
        }
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<QueuedJob>> {
        Ok(self.jobs.lock().await.iter().find(|j| &j.id == id).cloned())
    }

    async fn count_by_state(&self, state: JobState) -> Result<i64> {
        let jobs = self.jobs.lock().await;
        Ok(jobs.iter().filter(|j| j.state == state).count() as i64)
    }
}
