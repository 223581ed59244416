// Search Index Client Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

/// Document and index operations against the search store
///
/// Deleting a document or an index that does not exist must succeed, so
/// cleanup can be re-run after a partial failure.
#[async_trait]
pub trait SearchIndexClient: Send + Sync {
    /// Create or replace a document
    async fn index_document(&self, index: &str, id: &str, body: serde_json::Value) -> Result<()>;

    /// Partially update an existing document
    async fn update_document(&self, index: &str, id: &str, body: serde_json::Value) -> Result<()>;

    /// Delete a single document
    async fn delete_document(&self, index: &str, id: &str) -> Result<()>;

    /// Delete an index (name may be a wildcard pattern)
    async fn delete_index(&self, name: &str) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// A call observed by the mock client
    #[derive(Debug, Clone, PartialEq)]
    pub enum SearchCall {
        Index {
            index: String,
            id: String,
            body: serde_json::Value,
        },
        Update {
            index: String,
            id: String,
        },
        DeleteDocument {
            index: String,
            id: String,
        },
        DeleteIndex {
            name: String,
        },
    }

    /// Mock SearchIndexClient recording every call
    #[derive(Default)]
    pub struct MockSearchIndexClient {
        calls: Arc<Mutex<Vec<SearchCall>>>,
        fail_index: Arc<Mutex<Option<String>>>,
        fail_delete_index: Arc<Mutex<Option<String>>>,
    }

    impl MockSearchIndexClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every `index_document` call fail
        pub fn new_failing_index(message: impl Into<String>) -> Self {
            let mock = Self::new();
            *mock.fail_index.lock().unwrap() = Some(message.into());
            mock
        }

        /// Make every `delete_index` call fail
        pub fn set_fail_delete_index(&self, message: Option<String>) {
            *self.fail_delete_index.lock().unwrap() = message;
        }

        pub fn calls(&self) -> Vec<SearchCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn index_count(&self) -> usize {
            self.count(|c| matches!(c, SearchCall::Index { .. }))
        }

        pub fn update_count(&self) -> usize {
            self.count(|c| matches!(c, SearchCall::Update { .. }))
        }

        pub fn delete_document_count(&self) -> usize {
            self.count(|c| matches!(c, SearchCall::DeleteDocument { .. }))
        }

        pub fn delete_index_count(&self) -> usize {
            self.count(|c| matches!(c, SearchCall::DeleteIndex { .. }))
        }

        pub fn deleted_indices(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    SearchCall::DeleteIndex { name } => Some(name),
                    _ => None,
                })
                .collect()
        }

        pub fn reset(&self) {
            self.calls.lock().unwrap().clear();
        }

        fn count(&self, pred: impl Fn(&SearchCall) -> bool) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
        }
    }

    #[async_trait]
    impl SearchIndexClient for MockSearchIndexClient {
        async fn index_document(
            &self,
            index: &str,
            id: &str,
            body: serde_json::Value,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(SearchCall::Index {
                index: index.to_string(),
                id: id.to_string(),
                body,
            });
            match self.fail_index.lock().unwrap().clone() {
                Some(msg) => Err(AppError::SearchIndex(msg)),
                None => Ok(()),
            }
        }

        async fn update_document(
            &self,
            index: &str,
            id: &str,
            _body: serde_json::Value,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(SearchCall::Update {
                index: index.to_string(),
                id: id.to_string(),
            });
            Ok(())
        }

        async fn delete_document(&self, index: &str, id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(SearchCall::DeleteDocument {
                index: index.to_string(),
                id: id.to_string(),
            });
            Ok(())
        }

        async fn delete_index(&self, name: &str) -> Result<()> {
            self.calls.lock().unwrap().push(SearchCall::DeleteIndex {
                name: name.to_string(),
            });
            match self.fail_delete_index.lock().unwrap().clone() {
                Some(msg) => Err(AppError::SearchIndex(msg)),
                None => Ok(()),
            }
        }
    }
}
