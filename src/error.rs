//! Error types for the inline-artifacts library.
//!
//! Every stage of the pipeline fails into the single [`ArtifactError`] enum.
//! The variants are grouped by the stage that raises them so a caller can
//! tell from the variant alone whether the upload itself was malformed
//! (codec/decoder), the bytes were not the kind of artifact expected
//! (converters), or the HTML output could not be produced (presenter).
//!
//! Nothing is retried internally. The one built-in recovery is the tabular
//! probe (CSV first, spreadsheet second), and when both attempts fail the
//! error keeps both reasons.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the inline-artifacts library.
#[derive(Debug, Error)]
pub enum ArtifactError {
    // ── Codec / decoder errors ────────────────────────────────────────────
    /// The input string does not contain the `;base64,` separator.
    #[error("Invalid input: must contain ';base64,' (got {preview:?})")]
    MalformedInput { preview: String },

    /// The payload after `;base64,` is not valid standard base64.
    #[error("Payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The MIME type has no known file extension.
    #[error("Unknown MIME type '{mime}': no file extension is registered for it")]
    UnknownType { mime: String },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The buffer is not decodable image data.
    #[error("Invalid file object. It does not contain image data: {detail}")]
    InvalidImage { detail: String },

    /// Re-encoding an image for display or download failed.
    #[error("Failed to encode image as {format}: {detail}")]
    ImageEncode { format: String, detail: String },

    /// Neither the CSV nor the spreadsheet parser accepted the buffer.
    #[error("File type not supported: not a CSV ({csv}) and not a spreadsheet ({spreadsheet})")]
    UnsupportedTableFormat { csv: String, spreadsheet: String },

    /// A literal table row does not have one value per column header.
    #[error("Row length does not match column headers length: row {row} has {found} values, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    // ── Presenter errors ──────────────────────────────────────────────────
    /// Serialising a table to CSV failed.
    #[error("Failed to write table as CSV: {0}")]
    TableWrite(String),

    /// Serialising a table to a spreadsheet failed.
    #[error("Failed to write table as spreadsheet: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Creating, reading or removing the scratch spreadsheet file failed.
    #[error("Temporary file error at '{path}': {source}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A plot surface could not be rasterised.
    #[error("Failed to render plot: {0}")]
    Plot(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ArtifactError {
    /// Build a [`ArtifactError::MalformedInput`] carrying a short, printable
    /// prefix of the offending input. Uploads can be megabytes long.
    pub(crate) fn malformed(input: &str) -> Self {
        let preview: String = input.chars().take(48).collect();
        ArtifactError::MalformedInput { preview }
    }
}
