// Cancellation Registry Port (Interface)

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::watch;

/// Cancellation signal handed to an indexing sub-job
///
/// The sub-job polls `is_cancelled` between units of work or awaits
/// `cancelled` in a `select!`.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until cancellation is requested
    ///
    /// Also returns when the registry dropped the sender, which only happens
    /// once the sub-job is no longer tracked.
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Sending half kept by the registry
#[derive(Debug)]
pub struct CancellationHandle {
    tx: watch::Sender<bool>,
}

impl CancellationHandle {
    pub fn cancel(&self) {
        // send_replace never fails, even with no live receivers
        self.tx.send_replace(true);
    }
}

/// Create a linked handle/token pair
pub fn cancellation_pair() -> (CancellationHandle, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (CancellationHandle { tx }, CancellationToken { rx })
}

/// Tracks in-flight indexing sub-jobs per repository
#[async_trait]
pub trait CancellationRegistry: Send + Sync {
    /// Register a new indexing sub-job for `uri` and return its token
    async fn register_index_job(&self, uri: &str) -> CancellationToken;

    /// Cancel every indexing sub-job of `uri`
    ///
    /// Succeeds when nothing is running.
    async fn cancel_index_job(&self, uri: &str) -> Result<()>;

    /// Number of indexing sub-jobs still registered for `uri`
    async fn active_index_jobs(&self, uri: &str) -> usize;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Mock registry counting cancellations
    #[derive(Default)]
    pub struct MockCancellationRegistry {
        cancelled: Arc<Mutex<Vec<String>>>,
        fail_with: Arc<Mutex<Option<String>>>,
    }

    impl MockCancellationRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            let mock = Self::new();
            *mock.fail_with.lock().unwrap() = Some(message.into());
            mock
        }

        pub fn cancel_count(&self) -> usize {
            self.cancelled.lock().unwrap().len()
        }

        pub fn cancelled_uris(&self) -> Vec<String> {
            self.cancelled.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CancellationRegistry for MockCancellationRegistry {
        async fn register_index_job(&self, _uri: &str) -> CancellationToken {
            let (_handle, token) = cancellation_pair();
            token
        }

        async fn cancel_index_job(&self, uri: &str) -> Result<()> {
            self.cancelled.lock().unwrap().push(uri.to_string());
            match self.fail_with.lock().unwrap().clone() {
                Some(msg) => Err(AppError::Cancellation(msg)),
                None => Ok(()),
            }
        }

        async fn active_index_jobs(&self, _uri: &str) -> usize {
            0
        }
    }
}
