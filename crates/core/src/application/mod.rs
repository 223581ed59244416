// Application Layer - Use Cases and Business Logic

pub mod delete_task;
pub mod delete_worker;
pub mod retry;
pub mod worker;

// Re-exports
pub use delete_task::DeleteTaskService;
pub use delete_worker::{CleanupStep, DeleteWorker};
pub use worker::{shutdown_channel, JobLifecycle, QueueWorker, ShutdownSender, ShutdownToken};
