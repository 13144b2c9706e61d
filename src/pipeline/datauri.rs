//! Data-URI codec: `data:<mime>;base64,<payload>` ⇄ `(meta, payload)`.
//!
//! Only the literal `;base64,` marker is significant. The split happens on
//! its *first* occurrence and everything after it is payload, even if the
//! marker appears again inside the payload text.

use crate::error::ArtifactError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Separator between the metadata prefix and the base64 payload.
pub const BASE64_MARKER: &str = ";base64,";

/// Split a data URI into its metadata (without the marker) and its base64 payload.
///
/// ```
/// use inline_artifacts::pipeline::datauri::parse;
///
/// let (meta, payload) = parse("data:text/plain;base64,aGVsbG8=").unwrap();
/// assert_eq!(meta, "data:text/plain");
/// assert_eq!(payload, "aGVsbG8=");
/// ```
pub fn parse(input: &str) -> Result<(&str, &str), ArtifactError> {
    input
        .split_once(BASE64_MARKER)
        .ok_or_else(|| ArtifactError::malformed(input))
}

/// Join a metadata prefix and a base64 payload back into a data URI.
///
/// `meta` may be given with or without the trailing `;base64,` marker; the
/// marker is written exactly once either way.
pub fn build(meta: &str, payload_b64: &str) -> String {
    let meta = meta.strip_suffix(BASE64_MARKER).unwrap_or(meta);
    let mut out = String::with_capacity(meta.len() + BASE64_MARKER.len() + payload_b64.len());
    out.push_str(meta);
    out.push_str(BASE64_MARKER);
    out.push_str(payload_b64);
    out
}

/// Base64-encode `bytes` and wrap them as `data:<mime>;base64,<payload>`.
pub fn encode_bytes(mime: &str, bytes: &[u8]) -> String {
    build(&format!("data:{mime}"), &STANDARD.encode(bytes))
}
