// Worker - Job execution loop

pub mod constants;
mod lifecycle;

use constants::*;
pub use lifecycle::JobLifecycle;

use crate::application::retry::{RetryDecision, RetryPolicy};
use crate::domain::QueuedJob;
use crate::error::{AppError, Result};
use crate::port::cancellation::{cancellation_pair, CancellationHandle, CancellationToken};
use crate::port::{JobQueue, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Shutdown signal for graceful termination
pub type ShutdownToken = CancellationToken;

/// Shutdown sender
pub type ShutdownSender = CancellationHandle;

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    cancellation_pair()
}

/// How one execute attempt ended
enum Outcome {
    Finished(std::result::Result<Result<crate::domain::JobResult>, tokio::task::JoinError>),
    TimedOut(u64),
}

/// Worker pulling delete jobs from a queue and driving the lifecycle hooks
pub struct QueueWorker {
    name: String,
    queue: Arc<dyn JobQueue>,
    handler: Arc<dyn JobLifecycle>,
    retry_policy: Arc<RetryPolicy>,
    time_provider: Arc<dyn TimeProvider>,
}

impl QueueWorker {
    pub fn new(
        name: impl Into<String>,
        queue: Arc<dyn JobQueue>,
        handler: Arc<dyn JobLifecycle>,
        retry_policy: Arc<RetryPolicy>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            queue,
            handler,
            retry_policy,
            time_provider,
        }
    }

    /// Run worker loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(worker = %self.name, "Worker started");
        loop {
            if shutdown.is_cancelled() {
                info!(worker = %self.name, "Worker shutting down");
                break;
            }
            match self.process_next_job().await {
                Ok(true) => {}
                Ok(false) => {
                    // No job available, sleep briefly (or wait for shutdown)
                    tokio::select! {
                        _ = sleep(IDLE_SLEEP_DURATION) => {},
                        _ = shutdown.cancelled() => {
                            info!(worker = %self.name, "Worker interrupted during idle");
                            break;
                        }
                    }
                }
                Err(e) => {
                    error!(worker = %self.name, error = %e, "Worker error");
                    tokio::select! {
                        _ = sleep(ERROR_RECOVERY_SLEEP_DURATION) => {},
                        _ = shutdown.cancelled() => {
                            info!(worker = %self.name, "Worker interrupted during error recovery");
                            break;
                        }
                    }
                }
            }
        }
        info!(worker = %self.name, "Worker stopped");
        Ok(())
    }

    /// Process next job from queue (returns true if a job was processed)
    pub async fn process_next_job(&self) -> Result<bool> {
        // Pop next job (already set to EXECUTING by the queue)
        let mut job = match self.queue.pop_next(self.time_provider.now_millis()).await? {
            Some(j) => j,
            None => return Ok(false),
        };

        job.attempts += 1;
        self.queue.update(&job).await?;
        info!(
            job_id = %job.id,
            uri = %job.uri(),
            attempt = %job.attempts,
            "Processing delete job"
        );

        match self.execute_isolated(&job).await {
            Outcome::Finished(Ok(Ok(result))) => {
                job.complete(self.time_provider.now_millis())?;
                self.queue.update(&job).await?;
                info!(job_id = %job.id, uri = %job.uri(), "Job completed");

                if let Err(e) = self.handler.on_job_completed(&job.job, &result).await {
                    warn!(job_id = %job.id, error = %e, "Completion hook failed");
                }
            }
            Outcome::Finished(Ok(Err(e))) => {
                self.handler.on_job_execution_error(&job.job, &e).await;
                self.retry_or_fail(&mut job, e.to_string()).await?;
            }
            Outcome::Finished(Err(join_err)) => {
                // Panics are not retried
                let e = AppError::Internal(format!("job task aborted: {}", join_err));
                error!(job_id = %job.id, error = %e, "Job panicked");
                self.handler.on_job_execution_error(&job.job, &e).await;
                job.fail(self.time_provider.now_millis(), e.to_string());
                self.queue.update(&job).await?;
            }
            Outcome::TimedOut(ms) => {
                self.handler.on_job_timeout(&job.job).await;
                self.retry_or_fail(&mut job, AppError::Timeout(ms).to_string())
                    .await?;
            }
        }
        Ok(true)
    }

    /// Run `execute_job` on its own task so a panic cannot take the worker down
    async fn execute_isolated(&self, job: &QueuedJob) -> Outcome {
        let handler = Arc::clone(&self.handler);
        let delete_job = job.job.clone();
        let mut handle = tokio::spawn(async move { handler.execute_job(&delete_job).await });

        match job.job.timeout_ms() {
            Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), &mut handle).await {
                Ok(joined) => Outcome::Finished(joined),
                Err(_) => {
                    // Abort only drops the future: a step already running on a
                    // blocking thread (e.g. a directory removal) may still finish
                    // in the background. Steps are idempotent, so the retry redoes it.
                    handle.abort();
                    warn!(job_id = %job.id, timeout_ms = %ms, "Job timed out");
                    Outcome::TimedOut(ms)
                }
            },
            None => Outcome::Finished(handle.await),
        }
    }

    async fn retry_or_fail(&self, job: &mut QueuedJob, error: String) -> Result<()> {
        match self.retry_policy.should_retry(job) {
            RetryDecision::Retry(delay_ms) => {
                info!(
                    job_id = %job.id,
                    attempt = %job.attempts,
                    delay_ms = %delay_ms,
                    error = %error,
                    "Retrying job after failure"
                );
                job.last_error = Some(error);
                self.retry_policy.prepare_for_retry(job, delay_ms);
            }
            RetryDecision::Failed => {
                error!(job_id = %job.id, error = %error, "Job failed after max retries");
                job.fail(self.time_provider.now_millis(), error);
            }
        }
        self.queue.update(job).await
    }
}
