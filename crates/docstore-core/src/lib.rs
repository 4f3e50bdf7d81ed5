//! Upload and retrieval orchestration for docstore.
//!
//! [`DocumentService`] composes a [`LocationRegistry`] and a
//! [`ContentStore`] and is the only place with business rules:
//!
//! - identifiers are write-once through [`DocumentService::upload`]
//! - content written for an upload whose registration fails is deleted again
//! - concurrent uploads for the same identifier are serialized
//! - [`DocumentService::get`] re-checks that registered content is reachable
//!   and classifies its MIME type
//!
//! [`LocationRegistry`]: docstore_registry::LocationRegistry
//! [`ContentStore`]: docstore_content::ContentStore

pub mod document;
pub mod error;
pub mod locks;
pub mod service;

pub use document::Document;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use service::DocumentService;

// Re-export key types
pub use docstore_content::{ContentStore, FsContentStore, InMemoryContentStore};
pub use docstore_registry::{InMemoryRegistry, LocationRegistry, LogRegistry, SyncMode};
pub use docstore_types::{DocumentId, Filename, Location};
