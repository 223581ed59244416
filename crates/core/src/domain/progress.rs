// Worker progress values shared with progress listeners

/// Progress value reported to clients
pub type Progress = i32;

/// Reserved progress markers
///
/// Anything in `INIT..=COMPLETED` is a percentage. Negative values are terminal
/// failure markers and are only emitted by the error and timeout hooks.
pub struct WorkerReservedProgress;

impl WorkerReservedProgress {
    pub const INIT: Progress = 0;
    pub const COMPLETED: Progress = 100;
    pub const ERROR: Progress = -100;
    pub const TIMEOUT: Progress = -200;
}

/// Single progress update for one repository
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProgressEvent {
    pub uri: String,
    pub progress: Progress,
}

impl ProgressEvent {
    pub fn new(uri: impl Into<String>, progress: Progress) -> Self {
        Self {
            uri: uri.into(),
            progress,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.progress == WorkerReservedProgress::COMPLETED || self.progress < 0
    }
}
