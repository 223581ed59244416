// In-memory CancellationRegistry implementation

use async_trait::async_trait;
use codeintel_core::error::Result;
use codeintel_core::port::{cancellation_pair, CancellationHandle, CancellationRegistry, CancellationToken};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;

/// Tracks indexing sub-jobs of this process, keyed by repository uri
#[derive(Default)]
pub struct InMemoryCancellationRegistry {
    jobs: Mutex<HashMap<String, Vec<CancellationHandle>>>,
}

impl InMemoryCancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CancellationRegistry for InMemoryCancellationRegistry {
    async fn register_index_job(&self, uri: &str) -> CancellationToken {
        let (handle, token) = cancellation_pair();
        self.jobs
            .lock()
            .await
            .entry(uri.to_string())
            .or_default()
            .push(handle);
        token
    }

    async fn cancel_index_job(&self, uri: &str) -> Result<()> {
        let handles = self.jobs.lock().await.remove(uri).unwrap_or_default();
        if handles.is_empty() {
            return Ok(());
        }

        for handle in &handles {
            handle.cancel();
        }
        info!(uri = %uri, cancelled = handles.len(), "Cancelled index jobs");
        Ok(())
    }

    async fn active_index_jobs(&self, uri: &str) -> usize {
        self.jobs.lock().await.get(uri).map_or(0, Vec::len)
    }
}
