//! HTML presenter: typed artifacts → inline HTML fragments.
//!
//! Every fragment embeds its payload as a `data:` URI, so the page needs no
//! further requests. Download anchors point at a data URI as well and use
//! the `download` attribute to name the saved file.
//!
//! ## Escaping
//!
//! Only text that ends up as element content in a table is escaped
//! ([`literal_table_to_html`], [`crate::Table::to_html`]). Image, plot and
//! download fragments interpolate link text and file names verbatim, so
//! calculators can put markup in their link text. Payloads are base64 and
//! cannot break out of the quoted attribute.

use crate::config::{
    ImageRenderOptions, PlotRenderOptions, TableDownloadFormat, TableRenderOptions,
    TextDownloadOptions,
};
use crate::error::ArtifactError;
use crate::output::RenderedHtml;
use crate::pipeline::datauri::encode_bytes;
use crate::pipeline::image::{encode, fit_within, resolve_image_type, ImageArtifact};
use crate::pipeline::plot::PlotSurface;
use crate::pipeline::table::Table;
use std::fmt::Display;
use tracing::debug;

/// Render an image as `<img src='data:image/…'>`, optionally with a download anchor.
///
/// The displayed copy is shrunk to fit `width × height` unless
/// `original_size` is set. The download carries the full-resolution image,
/// except for ICO, which cannot exceed 256×256. Both are encoded as the
/// resolved `download_type` (PNG by default).
pub fn render_image(
    image: &ImageArtifact,
    options: &ImageRenderOptions,
) -> Result<RenderedHtml, ArtifactError> {
    let image_type = resolve_image_type(options.download_type.as_deref());
    let mime = image_type.mime();

    let thumbnail = (!options.original_size)
        .then(|| fit_within(image.image(), options.width, options.height));
    let display_image = thumbnail.as_ref().unwrap_or(image.image());

    let display_bytes = encode(display_image, image_type.format)?;
    debug!(
        "Display image {}x{} as {}",
        display_image.width(),
        display_image.height(),
        mime
    );
    let display = img_tag(&encode_bytes(&mime, &display_bytes), None);

    if !options.download {
        return Ok(RenderedHtml::display_only(display));
    }

    let full_bytes = match thumbnail {
        Some(_) => encode(image.image(), image_type.format)?,
        None => display_bytes,
    };
    let file_name = format!("{}.{}", options.download_name, image_type.extension);
    let download = download_anchor(
        &encode_bytes(&mime, &full_bytes),
        &file_name,
        &options.download_text,
    );

    Ok(RenderedHtml::with_download(display, download))
}

/// Render a table as HTML, optionally with a CSV or spreadsheet download anchor.
pub fn render_table(
    table: &Table,
    options: &TableRenderOptions,
) -> Result<RenderedHtml, ArtifactError> {
    let display = table.to_html();

    if !options.download {
        return Ok(RenderedHtml::display_only(display));
    }

    let format = options.download_format;
    let bytes = match format {
        TableDownloadFormat::Csv => table.to_csv_bytes()?,
        TableDownloadFormat::Spreadsheet => table.to_xlsx_bytes()?,
    };
    debug!("Table download as {:?} → {} bytes", format, bytes.len());

    let file_name = format!("{}.{}", options.download_name, format.extension());
    let download = download_anchor(
        &encode_bytes(format.mime(), &bytes),
        &file_name,
        &options.download_text,
    );

    Ok(RenderedHtml::with_download(display, download))
}

/// Render a plot surface as `<img src='data:image/png;base64,…' width='…'>`.
///
/// The surface is closed once it has been rasterised, whether or not that
/// succeeded, and also when `options` fail validation. The download anchor
/// reuses the same PNG bytes.
pub fn render_plot<S: PlotSurface>(
    mut surface: S,
    options: &PlotRenderOptions,
) -> Result<RenderedHtml, ArtifactError> {
    let png = options
        .validate()
        .and_then(|()| surface.to_png(options.dpi));
    surface.close();
    let png = png?;

    let uri = encode_bytes("image/png", &png);
    debug!("Plot at {} dpi → {} bytes PNG", options.dpi, png.len());
    let display = img_tag(&uri, Some(options.width));

    if !options.download {
        return Ok(RenderedHtml::display_only(display));
    }

    let file_name = format!("{}.png", options.download_name);
    let download = download_anchor(&uri, &file_name, &options.download_text);
    Ok(RenderedHtml::with_download(display, download))
}

/// Wrap plain text as a `text/plain` download anchor.
pub fn text_to_download_link(text: &str, options: &TextDownloadOptions) -> String {
    let file_name = format!("{}{}", options.filename, options.normalized_extension());
    download_anchor(
        &encode_bytes("text/plain", text.as_bytes()),
        &file_name,
        &options.download_text,
    )
}

/// Build an HTML table straight from literal headers and rows.
///
/// Every header and cell is HTML-escaped.
///
/// ```
/// use inline_artifacts::literal_table_to_html;
///
/// let html = literal_table_to_html(&["x"], &[vec![1], vec![2]]);
/// assert!(html.starts_with("<table "));
/// assert!(html.contains("<tr><th>x</th></tr><tr><td>1</td></tr>"));
/// ```
pub fn literal_table_to_html<H, V>(headers: &[H], rows: &[Vec<V>]) -> String
where
    H: AsRef<str>,
    V: Display,
{
    let header_row: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape_html(h.as_ref())))
        .collect();

    let data_rows: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|v| format!("<td>{}</td>", escape_html(&v.to_string())))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    format!(
        "<table border='3' cellpadding='5' style='border-collapse:collapse;'><tr>{header_row}</tr>{data_rows}</table>"
    )
}

/// Escape `&`, `<`, `>`, `"` and `'` for use in HTML text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn img_tag(src: &str, width: Option<u32>) -> String {
    match width {
        Some(w) => format!("<img src='{src}' width='{w}'>"),
        None => format!("<img src='{src}'>"),
    }
}

fn download_anchor(href: &str, file_name: &str, text: &str) -> String {
    format!("<a href='{href}' download='{file_name}'>{text}</a>")
}
