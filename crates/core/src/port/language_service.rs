// Language Analysis Service Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

/// Language analysis service owning per-repository workspaces
#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Tear down the analysis workspace of `uri`
    ///
    /// Succeeds when no workspace exists.
    async fn delete_workspace(&self, uri: &str) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Mock language service counting workspace deletions
    #[derive(Default)]
    pub struct MockLanguageService {
        deleted: Arc<Mutex<Vec<String>>>,
        fail_with: Option<String>,
    }

    impl MockLanguageService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self {
                deleted: Arc::default(),
                fail_with: Some(message.into()),
            }
        }

        pub fn delete_count(&self) -> usize {
            self.deleted.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LanguageService for MockLanguageService {
        async fn delete_workspace(&self, uri: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(uri.to_string());
            match &self.fail_with {
                Some(msg) => Err(AppError::Workspace(msg.clone())),
                None => Ok(()),
            }
        }
    }
}
