// Delete Task Service - accepts repository delete requests

pub mod enqueue;


pub use enqueue::DeleteRequest;

use crate::application::worker::JobLifecycle;
use crate::domain::job::OPTION_MAX_ATTEMPTS;
use crate::domain::{JobId, QueuedJob};
use crate::error::Result;
use crate::port::{IdProvider, JobQueue, TimeProvider};
use std::sync::Arc;

/// Delete Task Service
pub struct DeleteTaskService {
    handler: Arc<dyn JobLifecycle>,
    queue: Arc<dyn JobQueue>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    default_max_attempts: Option<u32>,
}

impl DeleteTaskService {
    pub fn new(
        handler: Arc<dyn JobLifecycle>,
        queue: Arc<dyn JobQueue>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            handler,
            queue,
            id_provider,
            time_provider,
            default_max_attempts: None,
        }
    }

    /// Attempt budget for requests that do not set `max_attempts` themselves
    pub fn with_default_max_attempts(mut self, max_attempts: u32) -> Self {
        self.default_max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Enqueue a repository delete
    pub async fn enqueue(&self, mut req: DeleteRequest) -> Result<JobId> {
        if let Some(max_attempts) = self.default_max_attempts {
            req.options
                .entry(OPTION_MAX_ATTEMPTS)
                .or_insert_with(|| max_attempts.into());
        }
        enqueue::execute(
            self.handler.as_ref(),
            self.queue.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Look up a queued job
    pub async fn status(&self, job_id: &JobId) -> Result<Option<QueuedJob>> {
        self.queue.find_by_id(job_id).await
    }
}
