//! Top-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::model::GraphError;
use crate::persistence::{ImportError, StorageError};

/// Any error surfaced by the library
#[derive(Debug, Error)]
pub enum EditorError {
    /// A graph mutation was rejected
    #[error("edit rejected: {0}")]
    Graph(#[from] GraphError),

    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A project file that is not a valid document
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("flow '{0}' not found")]
    UnknownFlow(String),
}
