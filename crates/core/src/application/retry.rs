// Retry logic for failed delete jobs
use crate::domain::{JobState, QueuedJob};
use crate::port::TimeProvider;
use std::sync::Arc;
use tracing::{info, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the job (with backoff delay in ms)
    Retry(i64),
    /// Do not retry, job has failed permanently
    Failed,
}

/// Retry policy
///
/// Determines if a job should be retried based on:
/// - Current attempt count
/// - Maximum attempts allowed
/// - Backoff factor for exponential delay
pub struct RetryPolicy {
    time_provider: Arc<dyn TimeProvider>,
    base_delay_ms: i64,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for current time
    /// * `base_delay_ms` - Base delay in milliseconds (default: 1000)
    pub fn new(time_provider: Arc<dyn TimeProvider>, base_delay_ms: i64) -> Self {
        Self {
            time_provider,
            base_delay_ms,
        }
    }

    /// Determine if a job should be retried
    ///
    /// `attempts` counts executions already made, including the one that just
    /// failed. Backoff: `delay = base_delay * backoff_factor ^ (attempts - 1)`,
    /// scaled by a per-job jitter in `[0.9, 1.1]`.
    pub fn should_retry(&self, job: &QueuedJob) -> RetryDecision {
        if job.attempts >= job.max_attempts {
            warn!(
                job_id = %job.id,
                uri = %job.uri(),
                attempts = %job.attempts,
                max_attempts = %job.max_attempts,
                "Max retry attempts reached"
            );
            return RetryDecision::Failed;
        }

        let exponent = (job.attempts - 1).max(0);
        let base_delay_ms = self.base_delay_ms as f64 * job.backoff_factor.powi(exponent);

        // Use job.id as seed for deterministic jitter per job
        let jitter_seed = job.id.chars().map(|c| c as u32).sum::<u32>();
        let jitter_factor = 0.9 + ((jitter_seed % 21) as f64 / 100.0); // 0.9 to 1.1

        let delay_ms = (base_delay_ms * jitter_factor) as i64;

        info!(
            job_id = %job.id,
            attempt = %job.attempts,
            max_attempts = %job.max_attempts,
            delay_ms = %delay_ms,
            "Scheduling retry"
        );

        RetryDecision::Retry(delay_ms)
    }

    /// Put a failed job back in the queue after `delay_ms`
    pub fn prepare_for_retry(&self, job: &mut QueuedJob, delay_ms: i64) {
        job.state = JobState::Enqueued;
        job.started_at = None;
        job.not_before = Some(self.time_provider.now_millis() + delay_ms);

        info!(
            job_id = %job.id,
            attempt = %job.attempts,
            not_before = ?job.not_before,
            "Job prepared for retry"
        );
    }
}
