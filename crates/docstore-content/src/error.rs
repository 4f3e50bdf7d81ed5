use docstore_types::Location;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Nothing is stored at the location.
    #[error("content not found at {0}")]
    NotFound(Location),

    /// The location was not produced by this backend.
    #[error("location {0} is not managed by this store")]
    ForeignLocation(Location),

    /// A store lock was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for content store operations.
pub type ContentResult<T> = Result<T, ContentError>;
