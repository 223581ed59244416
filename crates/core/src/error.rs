// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Search index error: {0}")]
    SearchIndex(String),

    #[error("Repository storage error: {0}")]
    Storage(String),

    #[error("Cancellation error: {0}")]
    Cancellation(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timed out after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures raised by a downstream collaborator rather than by
    /// the caller's input.
    pub fn is_downstream(&self) -> bool {
        matches!(
            self,
            AppError::SearchIndex(_)
                | AppError::Storage(_)
                | AppError::Cancellation(_)
                | AppError::Workspace(_)
                | AppError::Io(_)
                | AppError::Timeout(_)
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
