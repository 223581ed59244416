//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::to_rpc_error;
use crate::types::{
    DeleteRepositoryRequest, DeleteRepositoryResponse, JobStatusRequest, JobStatusResponse,
    StatsRequest, StatsResponse,
};
use codeintel_core::application::delete_task::DeleteRequest;
use codeintel_core::application::DeleteTaskService;
use codeintel_core::domain::JobState;
use codeintel_core::error::AppError;
use codeintel_core::port::JobQueue;
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use tracing::info;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<DeleteTaskService>,
    queue: Arc<dyn JobQueue>,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(service: Arc<DeleteTaskService>, queue: Arc<dyn JobQueue>) -> Self {
        Self {
            service,
            queue,
            start_time: std::time::Instant::now(),
        }
    }

    /// repository.delete.v1
    pub async fn delete_repository(
        &self,
        params: DeleteRepositoryRequest,
    ) -> Result<DeleteRepositoryResponse, ErrorObjectOwned> {
        let uri = params.uri.clone();
        let job_id = self
            .service
            .enqueue(DeleteRequest {
                uri: params.uri,
                data_path: params.data_path,
                options: params.options,
            })
            .await
            .map_err(to_rpc_error)?;

        info!(job_id = %job_id, uri = %uri, "Repository delete requested");
        Ok(DeleteRepositoryResponse {
            job_id,
            state: JobState::Enqueued.to_string(),
            uri,
        })
    }

    /// job.status.v1
    pub async fn job_status(
        &self,
        params: JobStatusRequest,
    ) -> Result<JobStatusResponse, ErrorObjectOwned> {
        let job = self
            .service
            .status(&params.job_id)
            .await
            .map_err(to_rpc_error)?
            .ok_or_else(|| {
                to_rpc_error(AppError::NotFound(format!("Job {} not found", params.job_id)))
            })?;

        Ok(job.into())
    }

    /// admin.stats.v1
    pub async fn stats(&self, _params: StatsRequest) -> Result<StatsResponse, ErrorObjectOwned> {
        let enqueued = self.count(JobState::Enqueued).await?;
        let executing = self.count(JobState::Executing).await?;
        let completed = self.count(JobState::Completed).await?;
        let failed = self.count(JobState::Failed).await?;

        Ok(StatsResponse {
            enqueued_jobs: enqueued,
            executing_jobs: executing,
            completed_jobs: completed,
            failed_jobs: failed,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }

    async fn count(&self, state: JobState) -> Result<i64, ErrorObjectOwned> {
        self.queue.count_by_state(state).await.map_err(to_rpc_error)
    }
}
