//! Core error types for `Traktor`.

use thiserror::Error;

/// Core error type for `Traktor` data-model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Endpoint template is internally inconsistent.
    #[error("Invalid endpoint template {url}: {reason}")]
    InvalidTemplate {
        /// URL pattern of the offending template.
        url: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Parameters could not be interpreted as a parameter bag.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Unknown provider name.
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type for cache store operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store failed.
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// IO error from a persistent store.
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be (de)serialized.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
