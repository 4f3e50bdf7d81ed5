//! Foundation types for docstore.
//!
//! Every other docstore crate depends on `docstore-types`.
//!
//! # Key Types
//!
//! - [`DocumentId`] -- caller-chosen 64-bit identifier naming a logical document
//! - [`Location`] -- opaque string describing where a document's bytes live
//! - [`Filename`] -- an uploaded filename reduced to one safe path component

pub mod error;
pub mod filename;
pub mod id;
pub mod location;

pub use error::TypeError;
pub use filename::Filename;
pub use id::DocumentId;
pub use location::Location;
