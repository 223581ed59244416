// Progress Notifier Port (Interface)

use crate::domain::Progress;

/// Live progress channel towards connected clients
///
/// Broadcasting is fire-and-forget: implementations must not block and must
/// swallow delivery problems (no listeners, slow listeners).
pub trait ProgressNotifier: Send + Sync {
    fn broadcast_delete_progress(&self, uri: &str, progress: Progress);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::ProgressEvent;
    use std::sync::{Arc, Mutex};

    /// Mock notifier keeping every event in order
    #[derive(Default)]
    pub struct MockProgressNotifier {
        events: Arc<Mutex<Vec<ProgressEvent>>>,
    }

    impl MockProgressNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ProgressEvent> {
            self.events.lock().unwrap().clone()
        }

        /// Progress values only, in broadcast order
        pub fn progress_values(&self) -> Vec<Progress> {
            self.events().into_iter().map(|e| e.progress).collect()
        }
    }

    impl ProgressNotifier for MockProgressNotifier {
        fn broadcast_delete_progress(&self, uri: &str, progress: Progress) {
            self.events
                .lock()
                .unwrap()
                .push(ProgressEvent::new(uri, progress));
        }
    }
}
