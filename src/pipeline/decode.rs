//! Artifact decoding: data-URI string → in-memory buffer + metadata.
//!
//! The buffer is a `Cursor<Vec<u8>>` positioned at offset 0, so it can be
//! handed straight to any `Read + Seek` consumer (image decoders, CSV
//! readers, spreadsheet readers) without copying.
//!
//! Two tags can be derived from the metadata prefix:
//!
//! * the **file type** (`csv`, `jpeg`, `xlsx`, …) from [`file_type_of`],
//!   which never fails and yields `""` for anything it cannot match;
//! * the **file extension** (`.csv`, `.jpg`, `.xlsx`, …) from
//!   [`file_extension_of`], which resolves through a MIME table and fails
//!   with [`ArtifactError::UnknownType`] for unregistered types.

use crate::error::ArtifactError;
use crate::pipeline::datauri::{self, BASE64_MARKER};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Cursor;
use tracing::debug;

/// MIME type browsers report for `.xlsx` uploads.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Extensions folded onto their common spelling.
const EXTENSION_OVERRIDES: &[(&str, &str)] = &[(".jpe", ".jpg"), (".jpeg", ".jpg"), (".htm", ".html")];

/// Canonical extensions for MIME types whose registry entry lists several.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tiff"),
    ("image/x-icon", "ico"),
    ("image/svg+xml", "svg"),
    ("image/webp", "webp"),
    ("text/plain", "txt"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("application/json", "json"),
    ("application/pdf", "pdf"),
    ("application/vnd.ms-excel", "xls"),
    (XLSX_MIME, "xlsx"),
    ("video/mp4", "mp4"),
    ("audio/mpeg", "mp3"),
];

static RE_FILE_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/([^/]+);base64,").unwrap());

/// A decoded upload: the raw bytes plus the `data:<mime>;base64,` prefix they came with.
#[derive(Debug, Clone)]
pub struct DecodedArtifact {
    buffer: Cursor<Vec<u8>>,
    meta: String,
}

impl DecodedArtifact {
    /// The decoded bytes, positioned at offset 0.
    pub fn buffer(&self) -> &Cursor<Vec<u8>> {
        &self.buffer
    }

    /// Give up the metadata and keep only the byte buffer.
    pub fn into_buffer(self) -> Cursor<Vec<u8>> {
        self.buffer
    }

    /// Split into `(buffer, meta)`.
    pub fn into_parts(self) -> (Cursor<Vec<u8>>, String) {
        (self.buffer, self.meta)
    }

    /// The metadata prefix, always ending in `;base64,`.
    pub fn meta(&self) -> &str {
        &self.meta
    }

    pub fn mime_type(&self) -> Option<&str> {
        mime_type_of(&self.meta)
    }

    pub fn file_type(&self) -> String {
        file_type_of(&self.meta)
    }

    pub fn file_extension(&self) -> Result<String, ArtifactError> {
        file_extension_of(&self.meta)
    }

    pub fn len(&self) -> usize {
        self.buffer.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.get_ref().is_empty()
    }
}

/// Decode a data URI into a byte buffer.
pub fn decode(input: &str) -> Result<Cursor<Vec<u8>>, ArtifactError> {
    decode_with_meta(input).map(DecodedArtifact::into_buffer)
}

/// Decode a data URI into a byte buffer and keep its metadata prefix.
///
/// ASCII whitespace anywhere in the payload is skipped, so line-wrapped
/// base64 decodes the same as a single line.
pub fn decode_with_meta(input: &str) -> Result<DecodedArtifact, ArtifactError> {
    let (meta, payload) = datauri::parse(input)?;
    let bytes = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD.decode(compact)?
    } else {
        STANDARD.decode(payload)?
    };
    debug!("Decoded {} → {} bytes", meta, bytes.len());

    Ok(DecodedArtifact {
        buffer: Cursor::new(bytes),
        meta: format!("{meta}{BASE64_MARKER}"),
    })
}

/// Decode a data URI into a byte buffer and its canonical file extension (`.jpg`, `.csv`, …).
pub fn decode_with_extension(input: &str) -> Result<(Cursor<Vec<u8>>, String), ArtifactError> {
    let decoded = decode_with_meta(input)?;
    let extension = decoded.file_extension()?;
    Ok((decoded.into_buffer(), extension))
}

/// Extract the MIME type from a metadata prefix: `data:image/png;base64,` → `image/png`.
///
/// Returns `None` when the prefix does not start with `data:` or the type is empty.
pub fn mime_type_of(meta: &str) -> Option<&str> {
    let rest = meta.strip_prefix("data:")?;
    let end = rest.find([';', ',']).unwrap_or(rest.len());
    let mime = rest[..end].trim();
    (!mime.is_empty()).then_some(mime)
}

/// Short file-type tag from a metadata prefix: the MIME subtype after the
/// last `/`, with the OOXML spreadsheet type collapsed to `xlsx`.
///
/// Never fails; returns an empty string when nothing matches.
///
/// ```
/// use inline_artifacts::pipeline::decode::file_type_of;
///
/// assert_eq!(file_type_of("data:text/csv;base64,"), "csv");
/// assert_eq!(file_type_of("not a data uri"), "");
/// ```
pub fn file_type_of(meta: &str) -> String {
    let file_type = RE_FILE_TYPE
        .captures(meta)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    if file_type == "vnd.openxmlformats-officedocument.spreadsheetml.sheet" {
        return "xlsx".to_string();
    }
    file_type
}

/// Canonical file extension (with leading dot) for the MIME type in a metadata prefix.
pub fn file_extension_of(meta: &str) -> Result<String, ArtifactError> {
    let mime = mime_type_of(meta).ok_or_else(|| ArtifactError::UnknownType {
        mime: meta.to_string(),
    })?;
    let mime_lc = mime.to_ascii_lowercase();

    let ext = PREFERRED_EXTENSIONS
        .iter()
        .find(|(m, _)| *m == mime_lc)
        .map(|(_, ext)| *ext)
        .or_else(|| {
            mime_guess::get_mime_extensions_str(&mime_lc).and_then(|exts| exts.first().copied())
        })
        .ok_or_else(|| ArtifactError::UnknownType {
            mime: mime.to_string(),
        })?;

    Ok(normalize_extension(&format!(".{ext}")))
}

/// Fold `.jpe`/`.jpeg` onto `.jpg` and `.htm` onto `.html`; other extensions pass through.
pub fn normalize_extension(ext: &str) -> String {
    EXTENSION_OVERRIDES
        .iter()
        .find(|(from, _)| *from == ext)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| ext.to_string())
}
