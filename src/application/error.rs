//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid token stream {}: {message}", path.display())]
    Tokens { path: PathBuf, message: String },

    #[error("asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    #[error("duplicate output paths: {}", format_paths(.0))]
    DuplicateOutputs(Vec<PathBuf>),

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
