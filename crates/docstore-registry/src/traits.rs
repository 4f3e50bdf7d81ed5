//! The [`LocationRegistry`] trait.

use docstore_types::{DocumentId, Location};

use crate::error::RegistryResult;

/// Storage backend for identifier → location entries.
///
/// Implementations must be thread-safe. Errors are only ever produced by the
/// underlying storage; absence is not an error for [`exists`](Self::exists).
pub trait LocationRegistry: Send + Sync {
    /// Whether an entry exists for `id`.
    fn exists(&self, id: DocumentId) -> RegistryResult<bool>;

    /// Write the entry for `id`, replacing any previous one.
    fn save_path(&self, id: DocumentId, location: &Location) -> RegistryResult<()>;

    /// Read the entry for `id`.
    ///
    /// Returns [`RegistryError::NotFound`](crate::RegistryError::NotFound)
    /// when no entry exists.
    fn get_path(&self, id: DocumentId) -> RegistryResult<Location>;

    /// All registered identifiers, sorted ascending.
    fn ids(&self) -> RegistryResult<Vec<DocumentId>>;
}
