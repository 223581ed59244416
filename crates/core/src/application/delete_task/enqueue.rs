// Enqueue Use Case

use crate::application::worker::JobLifecycle;
use crate::domain::repository::validate_data_path;
use crate::domain::{DeleteJob, JobId, QueuedJob, RepositoryUri};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobQueue, TimeProvider};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Maximum number of option keys accepted on a delete request
pub const MAX_OPTION_KEYS: usize = 32;

/// Delete request as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub uri: String,
    pub data_path: String,

    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// Validate a delete request before anything is written
pub fn validate_request(req: &DeleteRequest) -> Result<()> {
    RepositoryUri::parse(req.uri.as_str())?;
    validate_data_path(&req.data_path)?;

    if req.options.len() > MAX_OPTION_KEYS {
        return Err(AppError::Validation(format!(
            "too many options ({} > {})",
            req.options.len(),
            MAX_OPTION_KEYS
        )));
    }
    for key in [
        crate::domain::job::OPTION_TIMEOUT_MS,
        crate::domain::job::OPTION_MAX_ATTEMPTS,
    ] {
        if let Some(value) = req.options.get(key) {
            if !value.as_u64().is_some_and(|n| n > 0) {
                return Err(AppError::Validation(format!(
                    "option '{}' must be a positive integer",
                    key
                )));
            }
        }
    }
    Ok(())
}

/// Execute enqueue use case
///
/// The delete status record is written before the job reaches the queue; if
/// that write fails the job is not queued and the error is returned.
///
/// # Arguments
///
/// * `handler` - Lifecycle handler receiving `on_job_enqueued`
/// * `queue` - Queue transport
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Delete request
pub async fn execute(
    handler: &dyn JobLifecycle,
    queue: &dyn JobQueue,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: DeleteRequest,
) -> Result<JobId> {
    validate_request(&req)?;

    let job = DeleteJob::new(req.uri, req.data_path).with_options(req.options);
    handler.on_job_enqueued(&job).await?;

    let job_id = id_provider.generate_id();
    let queued = QueuedJob::new(job_id.clone(), time_provider.now_millis(), job);
    queue.push(&queued).await?;

    info!(job_id = %job_id, uri = %queued.uri(), "Delete job queued");
    Ok(job_id)
}
