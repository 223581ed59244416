// Job lifecycle hooks invoked by the queue transport

use crate::domain::{DeleteJob, JobResult};
use crate::error::{AppError, Result};
use async_trait::async_trait;

/// Hooks a job handler exposes to the queue transport
///
/// Order for one job: `on_job_enqueued`, then one or more `execute_job`
/// attempts, each followed by exactly one of `on_job_completed`,
/// `on_job_execution_error` or `on_job_timeout`.
#[async_trait]
pub trait JobLifecycle: Send + Sync {
    /// Called once when the job is accepted; an error rejects the job
    async fn on_job_enqueued(&self, job: &DeleteJob) -> Result<()>;

    /// Run the job
    async fn execute_job(&self, job: &DeleteJob) -> Result<JobResult>;

    /// Called after a successful `execute_job`
    async fn on_job_completed(&self, job: &DeleteJob, result: &JobResult) -> Result<()>;

    /// Called after `execute_job` returned an error or panicked
    async fn on_job_execution_error(&self, job: &DeleteJob, error: &AppError);

    /// Called when the transport gave up waiting on `execute_job`
    async fn on_job_timeout(&self, job: &DeleteJob);
}
