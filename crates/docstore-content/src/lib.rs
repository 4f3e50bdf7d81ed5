//! Content storage for docstore.
//!
//! A content store persists raw byte streams and reopens them by
//! [`Location`](docstore_types::Location). It never sees the registry: it is
//! handed an identifier and filename, and returns the location it chose.
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`FsContentStore`] -- files under `<root>/files/<id>/<filename>`
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//!
//! The [`sniff`] module classifies content by its leading bytes.

pub mod error;
pub mod fs;
pub mod memory;
pub mod sniff;
pub mod traits;

pub use error::{ContentError, ContentResult};
pub use fs::{FsContentStore, FILES_DIR};
pub use memory::InMemoryContentStore;
pub use sniff::{detect_content_type, sniff_stream, SNIFF_LEN};
pub use traits::{ContentStore, ContentStream};
