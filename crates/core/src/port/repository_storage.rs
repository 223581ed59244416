// Repository Storage Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

/// Storage service scoped to one repository clone
#[async_trait]
pub trait RepositoryStorage: Send + Sync {
    /// Remove the clone and checkout from disk
    ///
    /// Removing a clone that is already gone succeeds.
    async fn remove(&self) -> Result<()>;
}

/// Builds storage services for a repository
pub trait RepositoryStorageFactory: Send + Sync {
    fn new_instance(&self, uri: &str, data_path: &str) -> Box<dyn RepositoryStorage>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Counters {
        instances: Vec<(String, String)>,
        removals: usize,
    }

    /// Mock factory recording constructions and removals
    #[derive(Default, Clone)]
    pub struct MockRepositoryStorageFactory {
        counters: Arc<Mutex<Counters>>,
        fail_remove: Option<String>,
    }

    impl MockRepositoryStorageFactory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self {
                counters: Arc::default(),
                fail_remove: Some(message.into()),
            }
        }

        pub fn instance_count(&self) -> usize {
            self.counters.lock().unwrap().instances.len()
        }

        /// `(uri, data_path)` of every constructed instance
        pub fn instances(&self) -> Vec<(String, String)> {
            self.counters.lock().unwrap().instances.clone()
        }

        pub fn remove_count(&self) -> usize {
            self.counters.lock().unwrap().removals
        }
    }

    struct MockRepositoryStorage {
        counters: Arc<Mutex<Counters>>,
        fail_remove: Option<String>,
    }

    #[async_trait]
    impl RepositoryStorage for MockRepositoryStorage {
        async fn remove(&self) -> Result<()> {
            self.counters.lock().unwrap().removals += 1;
            match &self.fail_remove {
                Some(msg) => Err(AppError::Storage(msg.clone())),
                None => Ok(()),
            }
        }
    }

    impl RepositoryStorageFactory for MockRepositoryStorageFactory {
        fn new_instance(&self, uri: &str, data_path: &str) -> Box<dyn RepositoryStorage> {
            self.counters
                .lock()
                .unwrap()
                .instances
                .push((uri.to_string(), data_path.to_string()));
            Box::new(MockRepositoryStorage {
                counters: Arc::clone(&self.counters),
                fail_remove: self.fail_remove.clone(),
            })
        }
    }
}
