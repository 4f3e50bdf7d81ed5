use std::fmt;
use std::io::{self, Read};

use docstore_content::ContentStream;
use docstore_types::DocumentId;

/// A retrieved document: its bytes as a seekable stream positioned at the
/// start, plus what a client needs to save it.
pub struct Document {
    pub id: DocumentId,
    /// Final path component of the stored location.
    pub filename: String,
    /// Sniffed from the leading bytes of the content.
    pub content_type: String,
    pub stream: Box<dyn ContentStream>,
}

impl Document {
    /// `Content-Disposition` value asking the client to save the file.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }

    /// Drain the stream into memory.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.stream.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
