// Progress broadcasting over a tokio broadcast channel

use codeintel_core::domain::{Progress, ProgressEvent};
use codeintel_core::port::ProgressNotifier;
use tokio::sync::broadcast;
use tracing::debug;

/// Default number of buffered events per subscriber
pub const DEFAULT_PROGRESS_CAPACITY: usize = 256;

/// Fans delete progress out to every subscriber (socket sessions, RPC streams)
///
/// Slow subscribers lag and drop old events; the sender never waits.
pub struct BroadcastProgressNotifier {
    tx: broadcast::Sender<ProgressEvent>,
}

impl BroadcastProgressNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastProgressNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_CAPACITY)
    }
}

impl ProgressNotifier for BroadcastProgressNotifier {
    fn broadcast_delete_progress(&self, uri: &str, progress: Progress) {
        let event = ProgressEvent::new(uri, progress);
        // Err only means nobody is listening right now
        if self.tx.send(event).is_err() {
            debug!(uri = %uri, progress = progress, "No progress subscribers");
        }
    }
}
