// Delete Job Domain Model

use serde::{Deserialize, Serialize};

/// Job ID (UUID v4)
pub type JobId = String;

/// Option key carrying a per-job timeout in milliseconds
pub const OPTION_TIMEOUT_MS: &str = "timeout";

/// Option key overriding the retry budget of a job
pub const OPTION_MAX_ATTEMPTS: &str = "max_attempts";

/// Default retry budget when the job does not carry one
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

/// Job State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Enqueued,
    Executing,
    Completed,
    Failed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Enqueued => write!(f, "ENQUEUED"),
            JobState::Executing => write!(f, "EXECUTING"),
            JobState::Completed => write!(f, "COMPLETED"),
            JobState::Failed => write!(f, "FAILED"),
        }
    }
}

/// What to delete: the repository and where its clone lives on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJobPayload {
    pub uri: String,
    pub data_path: String,
}

/// Delete job as handed over by the queue transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteJob {
    pub payload: DeleteJobPayload,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl DeleteJob {
    pub fn new(uri: impl Into<String>, data_path: impl Into<String>) -> Self {
        Self {
            payload: DeleteJobPayload {
                uri: uri.into(),
                data_path: data_path.into(),
            },
            options: serde_json::Map::new(),
        }
    }

    pub fn with_options(mut self, options: serde_json::Map<String, serde_json::Value>) -> Self {
        self.options = options;
        self
    }

    pub fn uri(&self) -> &str {
        &self.payload.uri
    }

    pub fn data_path(&self) -> &str {
        &self.payload.data_path
    }

    /// Per-job timeout in milliseconds, if the enqueuing client set one
    pub fn timeout_ms(&self) -> Option<u64> {
        self.options
            .get(OPTION_TIMEOUT_MS)
            .and_then(|v| v.as_u64())
            .filter(|ms| *ms > 0)
    }

    /// Retry budget, falling back to the default
    pub fn max_attempts(&self) -> i32 {
        self.options
            .get(OPTION_MAX_ATTEMPTS)
            .and_then(|v| v.as_i64())
            .map(|n| n.clamp(1, i32::MAX as i64) as i32)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Outcome of a successful execute phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub uri: String,
}

impl JobResult {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Queue envelope around a delete job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedJob {
    pub id: JobId,
    pub job: DeleteJob,
    pub state: JobState,

    pub created_at: i64, // epoch ms
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,

    // Retry logic
    pub attempts: i32,
    pub max_attempts: i32,
    pub backoff_factor: f64,
    /// Earliest time (epoch ms) the job may be popped again after a retry
    pub not_before: Option<i64>,

    pub last_error: Option<String>,
}

impl QueuedJob {
    /// Wrap a delete job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `job` - The delete job
    pub fn new(id: impl Into<String>, created_at: i64, job: DeleteJob) -> Self {
        let max_attempts = job.max_attempts();
        Self {
            id: id.into(),
            job,
            state: JobState::Enqueued,
            created_at,
            started_at: None,
            finished_at: None,
            attempts: 0,
            max_attempts,
            backoff_factor: 2.0,
            not_before: None,
            last_error: None,
        }
    }

    pub fn uri(&self) -> &str {
        self.job.uri()
    }

    /// Transition to Executing state with explicit timestamp
    pub fn start(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.state != JobState::Enqueued {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Executing.to_string(),
            });
        }
        self.state = JobState::Executing;
        self.started_at = Some(now_millis);
        self.not_before = None;
        Ok(())
    }

    /// Transition to Completed state with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.state != JobState::Executing {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Completed.to_string(),
            });
        }
        self.state = JobState::Completed;
        self.finished_at = Some(now_millis);
        self.last_error = None;
        Ok(())
    }

    /// Mark as Failed with explicit timestamp
    pub fn fail(&mut self, now_millis: i64, error: impl Into<String>) {
        self.state = JobState::Failed;
        self.finished_at = Some(now_millis);
        self.last_error = Some(error.into());
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, JobState::Completed | JobState::Failed)
    }
}
