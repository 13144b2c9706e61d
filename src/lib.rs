//! # inline-artifacts
//!
//! Move data across the boundary between a browser-submitted form and a
//! calculation running on the server, and back out again as inline HTML.
//!
//! Uploads arrive as base64 data URIs (`data:<mime>;base64,<payload>`).
//! This crate decodes them into byte buffers, images and tables, and renders
//! images, tables, plots and plain text back into self-contained HTML
//! fragments (`<img>`, `<table>`, `<a download>`) that can be dropped into a
//! rendered page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! "data:image/jpeg;base64,/9j/…"
//!  │
//!  ├─ 1. Codec     split meta / payload on the first ";base64,"
//!  ├─ 2. Decode    base64 → Cursor<Vec<u8>>, type tag, extension
//!  ├─ 3. Convert   ImageArtifact │ Table │ PlotSurface │ text
//!  └─ 4. Present   <img src='data:…'> / <table> / <a href='data:…' download>
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use inline_artifacts::{decode_to_table, render_table, TableRenderOptions};
//!
//! // "A,B\n1,2\n" as uploaded by the browser
//! let upload = "data:text/csv;base64,QSxCCjEsMgo=";
//!
//! let table = decode_to_table(upload)?;
//! assert_eq!(table.columns(), ["A", "B"]);
//!
//! let options = TableRenderOptions { download: true, ..Default::default() };
//! let html = render_table(&table, &options)?;
//! assert!(html.display.starts_with("<table"));
//! assert!(html.download.unwrap().starts_with("<a href='data:text/csv;base64,"));
//! # Ok::<(), inline_artifacts::ArtifactError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `artifact2html` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod present;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ImageRenderOptions, ImageRenderOptionsBuilder, PlotRenderOptions, PlotRenderOptionsBuilder,
    TableDownloadFormat, TableRenderOptions, TextDownloadOptions,
};
pub use convert::{
    decode_to_image, decode_to_image_with_extension, decode_to_image_with_type, decode_to_table,
    decode_to_table_with_type, inspect,
};
pub use error::ArtifactError;
pub use output::{ArtifactInfo, RenderedHtml};
pub use pipeline::datauri::{build, parse};
pub use pipeline::decode::{
    decode, decode_with_extension, decode_with_meta, file_extension_of, file_type_of,
    DecodedArtifact,
};
pub use pipeline::image::{to_image, ImageArtifact};
pub use pipeline::plot::{Figure, PlotSurface};
pub use pipeline::table::{table_from_rows, to_table, CellValue, Table};
pub use present::{
    escape_html, literal_table_to_html, render_image, render_plot, render_table,
    text_to_download_link,
};
