use std::io::Read;
use std::sync::Arc;

use docstore_content::{sniff_stream, ContentStore, InMemoryContentStore};
use docstore_registry::{InMemoryRegistry, LocationRegistry, RegistryError};
use docstore_types::{DocumentId, Filename, Location};
use tracing::{debug, error, info, warn};

use crate::document::Document;
use crate::error::{ServiceError, ServiceResult};
use crate::locks::UploadLocks;

/// Stores documents under caller-chosen identifiers and serves them back.
///
/// Generic over its backends so the same rules apply to the filesystem
/// deployment and to in-memory use in tests.
pub struct DocumentService {
    registry: Arc<dyn LocationRegistry>,
    content: Arc<dyn ContentStore>,
    locks: UploadLocks,
}

impl DocumentService {
    pub fn new(registry: Arc<dyn LocationRegistry>, content: Arc<dyn ContentStore>) -> Self {
        Self {
            registry,
            content,
            locks: UploadLocks::new(),
        }
    }

    /// A service with nothing on disk.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRegistry::new()),
            Arc::new(InMemoryContentStore::new()),
        )
    }

    pub fn registry(&self) -> &dyn LocationRegistry {
        self.registry.as_ref()
    }

    pub fn content(&self) -> &dyn ContentStore {
        self.content.as_ref()
    }

    /// Store `reader`'s bytes as a new document named `filename` under `id`.
    ///
    /// Fails with [`ServiceError::AlreadyExists`] if `id` is already
    /// registered. When registration fails after the content was written, the
    /// content is deleted before the error is returned.
    pub fn upload(
        &self,
        id: DocumentId,
        filename: &str,
        reader: &mut dyn Read,
    ) -> ServiceResult<Location> {
        let filename = Filename::new(filename).map_err(|e| {
            warn!(%id, op = "upload", error = %e, "rejected filename");
            ServiceError::InvalidInput(e.to_string())
        })?;

        let _guard = self.locks.acquire(id)?;

        let exists = self.registry.exists(id).map_err(|e| {
            error!(%id, op = "upload", error = %e, "failed to check whether ID exists");
            ServiceError::from(e)
        })?;
        if exists {
            warn!(%id, op = "upload", "ID already registered");
            return Err(ServiceError::AlreadyExists(id));
        }

        let location = self.content.store(id, &filename, reader).map_err(|e| {
            error!(%id, op = "upload", error = %e, "failed to store file");
            ServiceError::internal("error storing the file", e)
        })?;

        if let Err(e) = self.registry.save_path(id, &location) {
            error!(%id, op = "upload", %location, error = %e, "failed to register path");
            self.discard(id, &location);
            return Err(e.into());
        }

        info!(%id, %location, "document stored");
        Ok(location)
    }

    /// Look up `id` and open its content with a sniffed content type.
    pub fn get(&self, id: DocumentId) -> ServiceResult<Document> {
        let location = self.registry.get_path(id).map_err(|e| {
            match &e {
                RegistryError::NotFound(_) => debug!(%id, op = "get", "ID not registered"),
                _ => error!(%id, op = "get", error = %e, "failed to look up path"),
            }
            ServiceError::from(e)
        })?;

        let reachable = self.content.exists(&location).map_err(|e| {
            error!(%id, op = "get", %location, error = %e, "failed to check content");
            ServiceError::internal(format!("failed to check file with ID {id}"), e)
        })?;
        if !reachable {
            error!(%id, op = "get", %location, "registered content is missing");
            return Err(ServiceError::Unreachable { id, location });
        }

        let mut stream = self.content.open(&location).map_err(|e| {
            error!(%id, op = "get", %location, error = %e, "failed to open file");
            ServiceError::internal(format!("failed to open file with ID {id}"), e)
        })?;

        let content_type = sniff_stream(&mut *stream).map_err(|e| {
            error!(%id, op = "get", %location, error = %e, "failed to read file header");
            ServiceError::internal(format!("failed to determine type of file with ID {id}"), e)
        })?;

        debug!(%id, %location, content_type, "document opened");
        Ok(Document {
            id,
            filename: location.file_name().to_string(),
            content_type: content_type.to_string(),
            stream,
        })
    }

    /// All registered identifiers in ascending order.
    pub fn ids(&self) -> ServiceResult<Vec<DocumentId>> {
        self.registry.ids().map_err(|e| {
            error!(op = "list", error = %e, "failed to list IDs");
            ServiceError::from(e)
        })
    }

    /// Best-effort removal of content whose registration failed.
    fn discard(&self, id: DocumentId, location: &Location) {
        match self.content.delete(location) {
            Ok(_) => debug!(%id, %location, "removed unregistered content"),
            Err(e) => {
                error!(%id, %location, error = %e, "failed to remove unregistered content")
            }
        }
    }
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService").finish_non_exhaustive()
    }
}
