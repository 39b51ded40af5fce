//! Error types for namespace store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or mutating a namespace store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A namespace with this name already exists.
    #[error("namespace already exists: `{name}`")]
    DuplicateNamespace { name: String },

    /// The requested namespace is not in the store.
    #[error("namespace not found: `{name}`")]
    NotFound { name: String },

    /// The store file has not been created yet.
    #[error("store file not found: {}", .path.display())]
    StoreMissing { path: PathBuf },

    /// The store file exists but is not a valid namespace document.
    #[error("cannot parse store file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The in-memory mapping could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error while opening, writing or renaming the store file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for the "not found" family (missing namespace or
    /// missing store file).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::StoreMissing { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
