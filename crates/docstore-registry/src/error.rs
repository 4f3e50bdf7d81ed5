//! Error types for registry operations.

use docstore_types::DocumentId;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No entry exists for the identifier.
    #[error("path with id {0} not found")]
    NotFound(DocumentId),

    /// A registry lock was poisoned by a panicking writer.
    #[error("registry lock poisoned: {0}")]
    Poisoned(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a file-backed registry.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
