//! Error types for the cache layer and data store

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    /// Remote store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the remote key/value store
///
/// The cache itself has no error conditions; capacity pressure and expiry
/// are handled by eviction, not rejection. Everything here originates from
/// the remote backend behind the [`crate::store::RemoteStore`] seam.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be reached or timed out
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected or failed to persist
    #[error("Remote write failed: {0}")]
    WriteFailed(String),

    /// Payload could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
