//! Location registry for docstore.
//!
//! The registry maps a [`DocumentId`] to the [`Location`] where the
//! document's bytes live. It knows nothing about file contents and enforces
//! no uniqueness policy: [`LocationRegistry::save_path`] overwrites. Keeping
//! identifiers write-once is the job of the orchestrator one layer up.
//!
//! # Backends
//!
//! - [`InMemoryRegistry`] -- `HashMap` behind a `RwLock`, lost on drop
//! - [`LogRegistry`] -- append-only, CRC-framed log replayed on open
//!
//! [`DocumentId`]: docstore_types::DocumentId
//! [`Location`]: docstore_types::Location

pub mod error;
pub mod log;
pub mod memory;
pub mod traits;

pub use error::{RegistryError, RegistryResult};
pub use log::{LogRegistry, SyncMode};
pub use memory::InMemoryRegistry;
pub use traits::LocationRegistry;
