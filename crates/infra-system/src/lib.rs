// Codeintel Infrastructure - Local System Adapters
// Implements: RepositoryStorageFactory, LanguageService, CancellationRegistry,
// ProgressNotifier, JobQueue

mod cancellation_registry;
mod fs_util;
mod memory_queue;
mod progress_broadcaster;
mod repository_storage;
mod workspace;

pub use cancellation_registry::InMemoryCancellationRegistry;
pub use memory_queue::InMemoryJobQueue;
pub use progress_broadcaster::BroadcastProgressNotifier;
pub use repository_storage::{LocalRepositoryStorage, LocalRepositoryStorageFactory};
pub use workspace::LocalWorkspaceService;
