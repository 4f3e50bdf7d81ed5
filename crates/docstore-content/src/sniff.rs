//! Content-type detection from leading bytes.
//!
//! Classification looks at no more than [`SNIFF_LEN`] bytes and always
//! produces an answer. Order of checks:
//!
//! 1. HTML / XML markers after leading whitespace
//! 2. Unicode byte-order marks
//! 3. Binary signatures recognised by [`infer`], limited to the formats
//!    in [`SIGNATURES`]
//! 4. Plain text if no binary control bytes are present, else
//!    `application/octet-stream`

use std::io::{self, Read, Seek, SeekFrom};

/// Maximum number of leading bytes consulted.
pub const SNIFF_LEN: usize = 512;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const TEXT_XML: &str = "text/xml; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// Tags that mark a document as HTML when followed by a space or `>`.
const HTML_MARKERS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const BOMS: &[(&[u8], &str)] = &[
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", TEXT_PLAIN),
];

/// Formats trusted from an [`infer`] match, paired with the name reported.
///
/// `infer` also matches text-looking prefixes (`MZ`, `#!`, `{\rtf`) that
/// show up at the start of ordinary prose, so anything outside this table
/// falls through to the text/binary split.
const SIGNATURES: &[(&str, &str)] = &[
    ("image/png", "image/png"),
    ("image/jpeg", "image/jpeg"),
    ("image/gif", "image/gif"),
    ("image/bmp", "image/bmp"),
    ("image/webp", "image/webp"),
    ("image/vnd.microsoft.icon", "image/x-icon"),
    ("application/pdf", "application/pdf"),
    ("application/postscript", "application/postscript"),
    ("application/zip", "application/zip"),
    ("application/gzip", "application/x-gzip"),
    ("application/vnd.rar", "application/x-rar-compressed"),
    ("application/wasm", "application/wasm"),
    ("application/font-woff", "font/woff"),
    ("application/font-sfnt", "font/ttf"),
    ("audio/x-wav", "audio/wave"),
    ("audio/x-aiff", "audio/aiff"),
    ("audio/mpeg", "audio/mpeg"),
    ("audio/midi", "audio/midi"),
    ("audio/ogg", "application/ogg"),
    ("video/mp4", "video/mp4"),
    ("video/webm", "video/webm"),
    ("video/x-msvideo", "video/avi"),
];

/// Classify `data` by its first [`SNIFF_LEN`] bytes.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    let start = data
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(data.len());
    let markup = &data[start..];
    if HTML_MARKERS.iter().any(|tag| matches_tag(markup, tag)) {
        return TEXT_HTML;
    }
    if markup.starts_with(b"<?xml") {
        return TEXT_XML;
    }

    if let Some((_, mime)) = BOMS.iter().find(|(bom, _)| data.starts_with(bom)) {
        return *mime;
    }

    if let Some(mime) = infer::get(data).and_then(|kind| known_signature(kind.mime_type())) {
        return mime;
    }

    if data.iter().any(|b| is_binary_byte(*b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

/// Read up to [`SNIFF_LEN`] bytes from `stream`, classify them, and rewind
/// the stream to offset 0.
pub fn sniff_stream<S: Read + Seek + ?Sized>(stream: &mut S) -> io::Result<&'static str> {
    let mut buf = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    let content_type = detect_content_type(&buf[..filled]);
    stream.seek(SeekFrom::Start(0))?;
    Ok(content_type)
}

fn known_signature(inferred: &str) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(matched, _)| *matched == inferred)
        .map(|(_, reported)| *reported)
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0C | b'\r' | b' ')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Case-insensitive tag prefix followed by a tag-terminating byte.
fn matches_tag(data: &[u8], tag: &[u8]) -> bool {
    if data.len() <= tag.len() {
        return false;
    }
    data[..tag.len()].eq_ignore_ascii_case(tag) && matches!(data[tag.len()], b' ' | b'>')
}
