// Delete Worker - lifecycle handler for repository delete jobs

#[cfg(test)]
mod delete_worker_test;

use crate::application::worker::JobLifecycle;
use crate::domain::repository::{delete_status_id, DEFAULT_INDEX_PREFIX, DELETE_STATUS_FIELD};
use crate::domain::{DeleteJob, JobResult, Progress, RepositoryIndexNames, WorkerReservedProgress};
use crate::error::{AppError, Result};
use crate::port::{
    CancellationRegistry, LanguageService, ProgressNotifier, RepositoryStorageFactory,
    SearchIndexClient, TimeProvider,
};
use async_trait::async_trait;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cleanup steps of a delete job, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    CancelIndexJob,
    RemoveRepository,
    DeleteIndices,
    DeleteWorkspace,
}

impl std::fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupStep::CancelIndexJob => write!(f, "cancel_index_job"),
            CleanupStep::RemoveRepository => write!(f, "remove_repository"),
            CleanupStep::DeleteIndices => write!(f, "delete_indices"),
            CleanupStep::DeleteWorkspace => write!(f, "delete_workspace"),
        }
    }
}

/// Deletes a repository and everything derived from it
///
/// Holds no per-job state, so one instance can serve concurrent jobs for
/// different repositories.
pub struct DeleteWorker {
    search_client: Arc<dyn SearchIndexClient>,
    cancellation: Arc<dyn CancellationRegistry>,
    language_service: Arc<dyn LanguageService>,
    storage_factory: Arc<dyn RepositoryStorageFactory>,
    notifier: Arc<dyn ProgressNotifier>,
    time_provider: Arc<dyn TimeProvider>,
    index_prefix: String,
}

impl DeleteWorker {
    pub fn new(
        search_client: Arc<dyn SearchIndexClient>,
        cancellation: Arc<dyn CancellationRegistry>,
        language_service: Arc<dyn LanguageService>,
        storage_factory: Arc<dyn RepositoryStorageFactory>,
        notifier: Arc<dyn ProgressNotifier>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            search_client,
            cancellation,
            language_service,
            storage_factory,
            notifier,
            time_provider,
            index_prefix: DEFAULT_INDEX_PREFIX.to_string(),
        }
    }

    /// Override the prefix of every repository index
    pub fn with_index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.index_prefix = prefix.into();
        self
    }

    fn index_names(&self, uri: &str) -> RepositoryIndexNames {
        RepositoryIndexNames::new(self.index_prefix.as_str(), uri)
    }

    /// Upsert the delete status record of a repository
    async fn write_delete_status(
        &self,
        uri: &str,
        progress: Progress,
        error: Option<String>,
    ) -> Result<()> {
        let now = self.time_provider.now_millis();
        let timestamp = chrono::DateTime::from_timestamp_millis(now)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        let mut status = json!({
            "uri": uri,
            "progress": progress,
            "timestamp": timestamp,
        });
        if let Some(err) = error {
            status["error"] = json!(err);
        }

        self.search_client
            .index_document(
                &self.index_names(uri).document(),
                &delete_status_id(uri),
                json!({ DELETE_STATUS_FIELD: status }),
            )
            .await
    }

    /// Await one cleanup step, logging which step broke
    async fn run_step<T>(
        &self,
        step: CleanupStep,
        uri: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        debug!(uri = %uri, step = %step, "Running cleanup step");
        fut.await.map_err(|e| {
            error!(uri = %uri, step = %step, error = %e, "Cleanup step failed");
            e
        })
    }

    async fn delete_indices(&self, uri: &str) -> Result<()> {
        // Every pattern is attempted even when the repository never got
        // symbols or references indexed.
        for pattern in self.index_names(uri).deletion_patterns() {
            self.search_client.delete_index(&pattern).await?;
            debug!(uri = %uri, index = %pattern, "Deleted index");
        }
        Ok(())
    }

    async fn remove_repository(&self, uri: &str, data_path: &str) -> Result<()> {
        let storage = self.storage_factory.new_instance(uri, data_path);
        storage.remove().await
    }
}

#[async_trait]
impl JobLifecycle for DeleteWorker {
    async fn on_job_enqueued(&self, job: &DeleteJob) -> Result<()> {
        let uri = job.uri();
        self.write_delete_status(uri, WorkerReservedProgress::INIT, None)
            .await?;
        info!(uri = %uri, "Repository delete job enqueued");
        Ok(())
    }

    async fn execute_job(&self, job: &DeleteJob) -> Result<JobResult> {
        let uri = job.uri();
        info!(uri = %uri, data_path = %job.data_path(), "Executing repository delete job");

        self.notifier
            .broadcast_delete_progress(uri, WorkerReservedProgress::INIT);

        // Indexing sub-jobs read the clone, so they must stop before it goes
        self.run_step(
            CleanupStep::CancelIndexJob,
            uri,
            self.cancellation.cancel_index_job(uri),
        )
        .await?;

        self.run_step(
            CleanupStep::RemoveRepository,
            uri,
            self.remove_repository(uri, job.data_path()),
        )
        .await?;

        self.run_step(CleanupStep::DeleteIndices, uri, self.delete_indices(uri))
            .await?;

        self.run_step(
            CleanupStep::DeleteWorkspace,
            uri,
            self.language_service.delete_workspace(uri),
        )
        .await?;

        self.notifier
            .broadcast_delete_progress(uri, WorkerReservedProgress::COMPLETED);
        info!(uri = %uri, "Clean up data for repository done");

        Ok(JobResult::new(uri))
    }

    async fn on_job_completed(&self, job: &DeleteJob, result: &JobResult) -> Result<()> {
        // The status record went away with the document index; the
        // absence of the record is the terminal state.
        info!(uri = %job.uri(), result_uri = %result.uri, "Repository delete job completed");
        Ok(())
    }

    async fn on_job_execution_error(&self, job: &DeleteJob, error: &AppError) {
        let uri = job.uri();
        warn!(uri = %uri, error = %error, "Repository delete job failed");

        self.notifier
            .broadcast_delete_progress(uri, WorkerReservedProgress::ERROR);
        if let Err(e) = self
            .write_delete_status(uri, WorkerReservedProgress::ERROR, Some(error.to_string()))
            .await
        {
            warn!(uri = %uri, error = %e, "Failed to record delete error status");
        }
    }

    async fn on_job_timeout(&self, job: &DeleteJob) {
        let uri = job.uri();
        warn!(uri = %uri, "Repository delete job timed out");

        self.notifier
            .broadcast_delete_progress(uri, WorkerReservedProgress::TIMEOUT);
        if let Err(e) = self
            .write_delete_status(uri, WorkerReservedProgress::TIMEOUT, None)
            .await
        {
            warn!(uri = %uri, error = %e, "Failed to record delete timeout status");
        }
    }
}
