//! Pipeline stages between a browser upload and an HTML fragment.
//!
//! Each submodule implements one transformation step and can be used on its
//! own. Data flows one way per call; no stage keeps state between calls.
//!
//! ## Data Flow
//!
//! ```text
//! datauri ──▶ decode ──▶ image / table ──▶ crate::present
//! (split)     (base64)   (typed artifact)   (inline HTML)
//!                        plot ──────────────▶
//! ```
//!
//! 1. [`datauri`] — split/join `data:<mime>;base64,<payload>`
//! 2. [`decode`]  — base64 → `Cursor<Vec<u8>>` plus type/extension tags
//! 3. [`image`]   — open raster images, shrink for display, re-encode
//! 4. [`table`]   — CSV/spreadsheet probe, CSV/XLSX serialisation
//! 5. [`plot`]    — surfaces that rasterise to PNG at a given DPI

pub mod datauri;
pub mod decode;
pub mod image;
pub mod plot;
pub mod table;
