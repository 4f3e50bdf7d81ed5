use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::RwLock;

use docstore_types::{DocumentId, Filename, Location};

use crate::error::{ContentError, ContentResult};
use crate::traits::{ContentStore, ContentStream};

const SCHEME: &str = "mem://";

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. Locations look like
/// `mem://<id>/<filename>`; content is copied on read.
pub struct InMemoryContentStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(location: &Location) -> ContentResult<&str> {
        if location.as_str().starts_with(SCHEME) {
            Ok(location.as_str())
        } else {
            Err(ContentError::ForeignLocation(location.clone()))
        }
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn store(
        &self,
        id: DocumentId,
        filename: &Filename,
        reader: &mut dyn Read,
    ) -> ContentResult<Location> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let location = Location::new(format!("{SCHEME}{id}/{filename}"));
        let mut map = self
            .objects
            .write()
            .map_err(|e| ContentError::Poisoned(e.to_string()))?;
        map.insert(location.as_str().to_string(), data);
        Ok(location)
    }

    fn open(&self, location: &Location) -> ContentResult<Box<dyn ContentStream>> {
        let key = Self::key(location)?;
        let map = self
            .objects
            .read()
            .map_err(|e| ContentError::Poisoned(e.to_string()))?;
        map.get(key)
            .map(|data| Box::new(Cursor::new(data.clone())) as Box<dyn ContentStream>)
            .ok_or_else(|| ContentError::NotFound(location.clone()))
    }

    fn exists(&self, location: &Location) -> ContentResult<bool> {
        let key = Self::key(location)?;
        let map = self
            .objects
            .read()
            .map_err(|e| ContentError::Poisoned(e.to_string()))?;
        Ok(map.contains_key(key))
    }

    fn delete(&self, location: &Location) -> ContentResult<bool> {
        let key = Self::key(location)?;
        let mut map = self
            .objects
            .write()
            .map_err(|e| ContentError::Poisoned(e.to_string()))?;
        Ok(map.remove(key).is_some())
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(store: &InMemoryContentStore, id: i64, name: &str, data: &[u8]) -> Location {
        store
            .store(
                DocumentId::new(id),
                &Filename::new(name).unwrap(),
                &mut Cursor::new(data.to_vec()),
            )
            .unwrap()
    }

    #[test]
    fn store_and_open() {
        let store = InMemoryContentStore::new();
        let loc = put(&store, 1, "a.txt", b"hello");
        assert_eq!(loc.as_str(), "mem://1/a.txt");

        let mut buf = Vec::new();
        store.open(&loc).unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hello");
    }

    #[test]
    fn open_missing_is_not_found() {
        let store = InMemoryContentStore::new();
        let err = store.open(&Location::new("mem://1/none")).err().unwrap();
        assert!(matches!(err, ContentError::NotFound(_)));
    }

    #[test]
    fn foreign_location_is_refused() {
        let store = InMemoryContentStore::new();
        assert!(matches!(
            store.exists(&Location::new("/tmp/files/1/a")),
            Err(ContentError::ForeignLocation(_))
        ));
    }

    #[test]
    fn delete_present_and_missing() {
        let store = InMemoryContentStore::new();
        let loc = put(&store, 2, "b.bin", &[1, 2, 3]);
        assert!(store.exists(&loc).unwrap());
        assert!(store.delete(&loc).unwrap());
        assert!(!store.exists(&loc).unwrap());
        assert!(!store.delete(&loc).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn debug_format() {
        let store = InMemoryContentStore::new();
        put(&store, 1, "x", b"x");
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryContentStore"));
        assert!(debug.contains("object_count"));
    }
}
