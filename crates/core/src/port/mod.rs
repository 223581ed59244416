// Port Layer - Interfaces for external dependencies

pub mod cancellation;
pub mod id_provider; // For deterministic testing
pub mod job_queue;
pub mod language_service;
pub mod progress_notifier;
pub mod repository_storage;
pub mod search_index;
pub mod time_provider;

// Re-exports
pub use cancellation::{cancellation_pair, CancellationHandle, CancellationRegistry, CancellationToken};
pub use id_provider::IdProvider;
pub use job_queue::JobQueue;
pub use language_service::LanguageService;
pub use progress_notifier::ProgressNotifier;
pub use repository_storage::{RepositoryStorage, RepositoryStorageFactory};
pub use search_index::SearchIndexClient;
pub use time_provider::TimeProvider;
