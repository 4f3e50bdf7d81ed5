//! Per-identifier mutual exclusion for uploads.
//!
//! The check-then-store-then-register sequence must not interleave for one
//! identifier; uploads for different identifiers proceed in parallel.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

use docstore_types::DocumentId;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Default)]
pub struct UploadLocks {
    held: Mutex<HashSet<DocumentId>>,
    released: Condvar,
}

impl UploadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no other upload holds `id`, then take it.
    pub fn acquire(&self, id: DocumentId) -> ServiceResult<UploadGuard<'_>> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| ServiceError::internal_message("upload lock poisoned"))?;
        while held.contains(&id) {
            held = self
                .released
                .wait(held)
                .map_err(|_| ServiceError::internal_message("upload lock poisoned"))?;
        }
        held.insert(id);
        Ok(UploadGuard { locks: self, id })
    }

    pub fn is_held(&self, id: DocumentId) -> bool {
        match self.held.lock() {
            Ok(held) => held.contains(&id),
            Err(poisoned) => poisoned.into_inner().contains(&id),
        }
    }
}

/// Releases its identifier on drop.
#[derive(Debug)]
pub struct UploadGuard<'a> {
    locks: &'a UploadLocks,
    id: DocumentId,
}

impl UploadGuard<'_> {
    pub fn id(&self) -> DocumentId {
        self.id
    }
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        let mut held = match self.locks.held.lock() {
            Ok(held) => held,
            Err(poisoned) => poisoned.into_inner(),
        };
        held.remove(&self.id);
        drop(held);
        self.locks.released.notify_all();
    }
}
