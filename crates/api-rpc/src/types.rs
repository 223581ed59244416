//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use codeintel_core::domain::QueuedJob;
use serde::{Deserialize, Serialize};

/// repository.delete.v1 - Request deletion of everything derived from a repository
#[derive(Debug, Deserialize)]
pub struct DeleteRepositoryRequest {
    pub uri: String,
    pub data_path: String,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteRepositoryResponse {
    pub job_id: String,
    pub state: String,
    pub uri: String,
}

/// job.status.v1 - Look up a delete job
#[derive(Debug, Deserialize)]
pub struct JobStatusRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub uri: String,
    pub state: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
}

impl From<QueuedJob> for JobStatusResponse {
    fn from(job: QueuedJob) -> Self {
        Self {
            uri: job.uri().to_string(),
            state: job.state.to_string(),
            job_id: job.id,
            attempts: job.attempts,
            max_attempts: job.max_attempts,
            last_error: job.last_error,
        }
    }
}

/// admin.stats.v1 - Get queue statistics
#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub enqueued_jobs: i64,
    pub executing_jobs: i64,
    pub completed_jobs: i64,
    pub failed_jobs: i64,
    pub uptime_seconds: i64,
}
