//! Filesystem content store.
//!
//! Layout under the configured root:
//!
//! ```text
//! <root>/
//! └── files/
//!     └── <document id>/
//!         └── <original filename>
//! ```
//!
//! Keying the directory by identifier means two documents uploaded under the
//! same filename never share bytes on disk, while the original name is still
//! available for download headers.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

use docstore_types::{DocumentId, Filename, Location};
use tracing::{debug, warn};

use crate::error::{ContentError, ContentResult};
use crate::traits::{ContentStore, ContentStream};

/// Name of the directory, under the root, that holds all stored content.
pub const FILES_DIR: &str = "files";

/// A [`ContentStore`] writing one file per document on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
    files_dir: PathBuf,
}

impl FsContentStore {
    /// Create a store rooted at `root`.
    ///
    /// The root is made absolute against the current directory but is not
    /// created; directories are created on first write.
    pub fn new(root: impl AsRef<Path>) -> ContentResult<Self> {
        let root = std::path::absolute(root.as_ref())?;
        Ok(Self {
            files_dir: root.join(FILES_DIR),
            root,
        })
    }

    /// The absolute root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding all stored content.
    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    fn document_dir(&self, id: DocumentId) -> PathBuf {
        self.files_dir.join(id.to_string())
    }

    /// Map a location back to a path, refusing anything outside `files/`.
    ///
    /// `starts_with` compares components lexically, so `..` has to be
    /// rejected separately.
    fn resolve(&self, location: &Location) -> ContentResult<PathBuf> {
        let path = PathBuf::from(location.as_str());
        let escapes = path.components().any(|c| c == Component::ParentDir);
        if escapes || !path.is_absolute() || !path.starts_with(&self.files_dir) {
            return Err(ContentError::ForeignLocation(location.clone()));
        }
        Ok(path)
    }
}

impl ContentStore for FsContentStore {
    fn store(
        &self,
        id: DocumentId,
        filename: &Filename,
        reader: &mut dyn Read,
    ) -> ContentResult<Location> {
        let dir = self.document_dir(id);
        fs::create_dir_all(&dir).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to create directory {}: {e}", dir.display()),
            )
        })?;

        let path = dir.join(filename.as_str());
        let location = path
            .to_str()
            .map(Location::new)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("storage path is not valid UTF-8: {}", path.display()),
                )
            })?;

        let file = File::create(&path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to create file {}: {e}", path.display()),
            )
        })?;

        match copy_all(reader, file) {
            Ok(bytes) => {
                debug!(%id, %location, bytes, "content stored");
                Ok(location)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&path) {
                    warn!(%id, path = %path.display(), error = %cleanup, "failed to remove partial file");
                }
                Err(io::Error::new(
                    e.kind(),
                    format!("failed to write to file {}: {e}", path.display()),
                )
                .into())
            }
        }
    }

    fn open(&self, location: &Location) -> ContentResult<Box<dyn ContentStream>> {
        let path = self.resolve(location)?;
        match File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ContentError::NotFound(location.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, location: &Location) -> ContentResult<bool> {
        let path = self.resolve(location)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, location: &Location) -> ContentResult<bool> {
        let path = self.resolve(location)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                // Drop the per-document directory too; it only fails if
                // something else still lives there.
                if let Some(parent) = path.parent() {
                    let _ = fs::remove_dir(parent);
                }
                debug!(%location, "content deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn copy_all(reader: &mut dyn Read, file: File) -> io::Result<u64> {
    let mut writer = BufWriter::new(file);
    let bytes = io::copy(reader, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}
