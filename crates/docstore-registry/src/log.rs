//! Durable registry backed by an append-only log file.
//!
//! Every [`save_path`](LocationRegistry::save_path) appends one record; the
//! whole file is replayed into an in-memory index on [`LogRegistry::open`],
//! later records winning over earlier ones for the same identifier.
//!
//! On-disk record format:
//! ```text
//! [4 bytes: payload length (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (bincode-serialized (DocumentId, Location))]
//! ```

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use docstore_types::{DocumentId, Location};
use tracing::{debug, error, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::traits::LocationRegistry;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Upper bound on a record payload. Longer length fields are treated as
/// damage during replay.
const MAX_RECORD_LEN: usize = 64 * 1024;

/// Flush strategy for appended records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// `fsync` after every record.
    EveryWrite,
    /// Flush to the OS and rely on its page cache.
    #[default]
    OsDefault,
}

/// A [`LocationRegistry`] that survives process restarts.
///
/// Damaged records are skipped during replay and the scan resumes at the
/// next intact record, so one bad header never hides the records after it.
/// Damage that runs to the end of the file (a crash mid-append) is cut off
/// so later appends stay readable.
pub struct LogRegistry {
    path: PathBuf,
    writer: Mutex<LogWriter<File>>,
    index: RwLock<HashMap<DocumentId, Location>>,
    sync_mode: SyncMode,
}

impl LogRegistry {
    /// Open (or create) the log at `path` and replay it.
    pub fn open(path: &Path, sync_mode: SyncMode) -> RegistryResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let mut log = Vec::new();
        file.read_to_end(&mut log)?;
        let file_len = log.len() as u64;
        let (index, valid_len) = replay(&log);
        if valid_len < file_len {
            error!(
                path = %path.display(),
                valid_len,
                dropped_bytes = file_len - valid_len,
                "discarding damaged tail of registry log"
            );
            file.set_len(valid_len)?;
        }

        debug!(path = %path.display(), entries = index.len(), "registry log replayed");
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(LogWriter::new(file, valid_len)),
            index: RwLock::new(index),
            sync_mode,
        })
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct identifiers currently registered.
    pub fn len(&self) -> RegistryResult<usize> {
        Ok(self.read_index()?.len())
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> RegistryResult<bool> {
        Ok(self.read_index()?.is_empty())
    }

    fn read_index(
        &self,
    ) -> RegistryResult<std::sync::RwLockReadGuard<'_, HashMap<DocumentId, Location>>> {
        self.index
            .read()
            .map_err(|e| RegistryError::Poisoned(e.to_string()))
    }
}

impl LocationRegistry for LogRegistry {
    fn exists(&self, id: DocumentId) -> RegistryResult<bool> {
        Ok(self.read_index()?.contains_key(&id))
    }

    fn save_path(&self, id: DocumentId, location: &Location) -> RegistryResult<()> {
        let payload = bincode::serialize(&(id, location))
            .map_err(|e| RegistryError::Serialization(e.to_string()))?;

        // The writer lock is held across the index update so the index never
        // disagrees with the order of records in the file.
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| RegistryError::Poisoned(e.to_string()))?;
        writer.append(&payload, self.sync_mode)?;

        let mut index = self
            .index
            .write()
            .map_err(|e| RegistryError::Poisoned(e.to_string()))?;
        index.insert(id, location.clone());

        debug!(%id, %location, "registry record appended");
        Ok(())
    }

    fn get_path(&self, id: DocumentId) -> RegistryResult<Location> {
        self.read_index()?
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    fn ids(&self) -> RegistryResult<Vec<DocumentId>> {
        let mut ids: Vec<DocumentId> = self.read_index()?.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}

impl std::fmt::Debug for LogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRegistry")
            .field("path", &self.path)
            .field("sync_mode", &self.sync_mode)
            .finish()
    }
}

/// Append target for registry records.
trait LogSink: Write {
    /// Cut the sink back to `len` bytes.
    fn truncate(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LogSink for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Writes whole records or nothing.
///
/// A failed append is cut back off the sink before the error is returned.
/// If that cut fails too, it is retried before the next record goes out.
struct LogWriter<S> {
    sink: S,
    /// Length of the sink covered by successful appends.
    committed: u64,
    /// Bytes past `committed` may be on the sink.
    dirty: bool,
}

impl<S: LogSink> LogWriter<S> {
    fn new(sink: S, committed: u64) -> Self {
        Self {
            sink,
            committed,
            dirty: false,
        }
    }

    fn append(&mut self, payload: &[u8], sync_mode: SyncMode) -> io::Result<()> {
        let frame = encode_frame(payload)?;

        if self.dirty {
            self.sink.truncate(self.committed)?;
            self.dirty = false;
        }

        match write_frame(&mut self.sink, &frame, sync_mode) {
            Ok(()) => {
                self.committed += frame.len() as u64;
                Ok(())
            }
            Err(e) => {
                if let Err(cut) = self.sink.truncate(self.committed) {
                    error!(
                        committed = self.committed,
                        error = %cut,
                        "failed to roll back partial registry record"
                    );
                    self.dirty = true;
                }
                Err(e)
            }
        }
    }
}

fn encode_frame(payload: &[u8]) -> io::Result<Vec<u8>> {
    if payload.len() > MAX_RECORD_LEN {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "registry record too large"));
    }
    let length = payload.len() as u32;
    let crc = crc32fast::hash(payload);

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

fn write_frame<S: LogSink>(sink: &mut S, frame: &[u8], sync_mode: SyncMode) -> io::Result<()> {
    sink.write_all(frame)?;
    sink.flush()?;
    if sync_mode == SyncMode::EveryWrite {
        sink.sync()?;
    }
    Ok(())
}

/// Payload of the record at the start of `log`, if it is complete and its
/// CRC matches.
fn intact_record(log: &[u8]) -> Option<&[u8]> {
    let header = log.get(..HEADER_SIZE)?;
    let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if length == 0 || length > MAX_RECORD_LEN {
        return None;
    }
    let payload = log.get(HEADER_SIZE..HEADER_SIZE + length)?;
    (crc32fast::hash(payload) == expected_crc).then_some(payload)
}

/// Replay all readable records. Returns the index and the length of the
/// log that should be kept.
///
/// When a record is damaged the scan looks for the next intact record and
/// carries on from there. Only damage with nothing intact after it is
/// reported as droppable.
fn replay(log: &[u8]) -> (HashMap<DocumentId, Location>, u64) {
    let mut index = HashMap::new();
    let mut offset = 0;

    while offset < log.len() {
        let Some(payload) = intact_record(&log[offset..]) else {
            let next = (offset + 1..log.len()).find(|&at| intact_record(&log[at..]).is_some());
            match next {
                Some(next) => {
                    error!(
                        offset,
                        dropped_bytes = next - offset,
                        "damaged registry record; resuming at next intact record"
                    );
                    offset = next;
                    continue;
                }
                None => break,
            }
        };

        match bincode::deserialize::<(DocumentId, Location)>(payload) {
            Ok((id, location)) => {
                index.insert(id, location);
            }
            Err(e) => {
                warn!(offset, error = %e, "undecodable registry record; skipping");
            }
        }
        offset += HEADER_SIZE + payload.len();
    }

    (index, offset as u64)
}
