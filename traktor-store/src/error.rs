//! Store error types.

use thiserror::Error;
use traktor_core::CacheError;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The settings file exists but does not parse.
    #[error("Invalid settings file {}: {source}", path.display())]
    InvalidSettings {
        /// Settings file.
        path: std::path::PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if the error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<StoreError> for CacheError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => CacheError::Io(e),
            StoreError::Serialization(e) | StoreError::InvalidSettings { source: e, .. } => {
                CacheError::Serialization(e)
            }
            StoreError::Config(msg) => CacheError::Backend(msg),
        }
    }
}
