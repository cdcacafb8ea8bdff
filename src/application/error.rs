//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add definition-file and config context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid tree definitions in {origin}: {message}")]
    InvalidDefinitions { origin: String, message: String },

    #[error("no definitions file: pass --file or set `definitions` in the config")]
    NoDefinitions,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
