//! Persistence: storage backends, debounced saving, JSON import/export

pub mod debounce;
pub mod export;
pub mod storage;

use std::path::PathBuf;

use thiserror::Error;

pub use debounce::{Clock, Debouncer, ManualClock, SystemClock};
pub use export::{
    export_document, export_file_name, export_json, import_json, ExportDocument, ProjectInfo,
    EXPORT_VERSION,
};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};

/// Errors from a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Stored project {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize project: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Reasons an imported file was rejected
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Error parsing JSON file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Invalid project file format: missing '{0}'")]
    MissingKey(&'static str),
    #[error("Invalid sitemap: {0}")]
    InvalidSitemap(String),
}
