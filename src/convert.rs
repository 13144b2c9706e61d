//! One-call entry points: data-URI string → typed artifact.
//!
//! These compose [`crate::pipeline::decode`] with a converter. The
//! `_with_type` variants also return the short file-type tag from the
//! upload's metadata (`jpeg`, `csv`, `xlsx`, …), and the `_with_extension`
//! variant returns the canonical extension (`.jpg`, …) instead.

use crate::error::ArtifactError;
use crate::output::ArtifactInfo;
use crate::pipeline::decode::{decode, decode_with_meta};
use crate::pipeline::image::{to_image, ImageArtifact};
use crate::pipeline::table::{to_table, Table};
use tracing::{debug, info};

/// Decode a data URI and open it as an image.
///
/// # Errors
/// - [`ArtifactError::MalformedInput`] / [`ArtifactError::Decode`] for a bad data URI
/// - [`ArtifactError::InvalidImage`] when the bytes are not an image
pub fn decode_to_image(input: &str) -> Result<ImageArtifact, ArtifactError> {
    to_image(decode(input)?)
}

/// Decode a data URI and open it as an image, also returning its file-type tag.
pub fn decode_to_image_with_type(input: &str) -> Result<(ImageArtifact, String), ArtifactError> {
    let (buffer, meta) = decode_with_meta(input)?.into_parts();
    let image = to_image(buffer)?;
    let file_type = crate::pipeline::decode::file_type_of(&meta);
    debug!("Image upload tagged '{}'", file_type);
    Ok((image, file_type))
}

/// Decode a data URI and open it as an image, also returning its canonical extension.
pub fn decode_to_image_with_extension(
    input: &str,
) -> Result<(ImageArtifact, String), ArtifactError> {
    let decoded = decode_with_meta(input)?;
    let extension = decoded.file_extension()?;
    Ok((to_image(decoded.into_buffer())?, extension))
}

/// Decode a data URI and read it as a table (CSV, then spreadsheet).
///
/// # Errors
/// - [`ArtifactError::MalformedInput`] / [`ArtifactError::Decode`] for a bad data URI
/// - [`ArtifactError::UnsupportedTableFormat`] when neither parser accepts the bytes
pub fn decode_to_table(input: &str) -> Result<Table, ArtifactError> {
    to_table(decode(input)?)
}

/// Decode a data URI and read it as a table, also returning its file-type tag.
pub fn decode_to_table_with_type(input: &str) -> Result<(Table, String), ArtifactError> {
    let decoded = decode_with_meta(input)?;
    let file_type = decoded.file_type();
    Ok((to_table(decoded.into_buffer())?, file_type))
}

/// Describe an upload without rendering it.
///
/// Only a malformed data URI or bad base64 is an error. An unregistered
/// MIME type or non-image payload just leaves the matching fields empty.
pub fn inspect(input: &str) -> Result<ArtifactInfo, ArtifactError> {
    let decoded = decode_with_meta(input)?;

    let mime_type = decoded.mime_type().map(str::to_string);
    let file_type = decoded.file_type();
    let file_extension = decoded.file_extension().ok();
    let byte_len = decoded.len();

    let (image_dimensions, image_format) = match to_image(decoded.into_buffer()) {
        Ok(img) => (Some(img.dimensions()), Some(format!("{:?}", img.format()))),
        Err(_) => (None, None),
    };

    info!(
        "Inspected upload: {} bytes, type '{}'",
        byte_len, file_type
    );

    Ok(ArtifactInfo {
        mime_type,
        file_type,
        file_extension,
        byte_len,
        image_dimensions,
        image_format,
    })
}
