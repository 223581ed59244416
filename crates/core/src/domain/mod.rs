// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod progress;
pub mod repository;

// Re-exports
pub use error::DomainError;
pub use job::{DeleteJob, DeleteJobPayload, JobId, JobResult, JobState, QueuedJob};
pub use progress::{Progress, ProgressEvent, WorkerReservedProgress};
pub use repository::{RepositoryIndexNames, RepositoryUri};
