use std::io::{Read, Seek};

use docstore_types::{DocumentId, Filename, Location};

use crate::error::ContentResult;

/// A readable, seekable handle on stored content.
///
/// Dropping the handle releases it.
pub trait ContentStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> ContentStream for T {}

/// Byte-stream store.
///
/// All implementations must satisfy these invariants:
/// - `store` returns only after every byte of the input has been persisted,
///   and leaves nothing behind when it fails.
/// - The returned location is stable: `open` on it yields the same bytes
///   until `delete` is called.
/// - Distinct identifiers never share a location.
pub trait ContentStore: Send + Sync {
    /// Persist everything `reader` yields for document `id`.
    fn store(
        &self,
        id: DocumentId,
        filename: &Filename,
        reader: &mut dyn Read,
    ) -> ContentResult<Location>;

    /// Open stored content positioned at offset 0.
    ///
    /// Returns [`ContentError::NotFound`](crate::ContentError::NotFound) if
    /// nothing is stored at `location`.
    fn open(&self, location: &Location) -> ContentResult<Box<dyn ContentStream>>;

    /// Check whether content exists at `location`.
    fn exists(&self, location: &Location) -> ContentResult<bool>;

    /// Remove content at `location`. Returns `true` if something was removed.
    fn delete(&self, location: &Location) -> ContentResult<bool>;
}
