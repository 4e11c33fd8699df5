//! Error types for loading, configuration and rendering.

use std::path::PathBuf;
use thiserror::Error;

pub type SalesResult<T> = Result<T, SalesError>;

#[derive(Debug, Error)]
pub enum SalesError {
    #[error("Failed to open data source '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Data source '{path}' has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
    #[error("Failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config '{path}': {message}")]
    ConfigParse { path: PathBuf, message: String },
    #[error("Invalid configuration: {0}")]
    Validation(String),
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SalesError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
