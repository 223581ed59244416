// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid repository uri '{uri}': {reason}")]
    InvalidRepositoryUri { uri: String, reason: String },

    #[error("Invalid data path '{0}'")]
    InvalidDataPath(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
