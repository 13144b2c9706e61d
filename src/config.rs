//! Per-operation options for the HTML presenter.
//!
//! Each presenter entry point takes one options struct. Defaults match the
//! values calculators have always relied on (200×200 thumbnails, 500 px
//! plots at 100 DPI, `myimg`/`myfile`/`myplot` download names), so
//! `Default::default()` reproduces the familiar output.
//!
//! The two option sets with numeric knobs that can be nonsensical
//! ([`ImageRenderOptions`], [`PlotRenderOptions`]) come with a builder that
//! validates on `build()`.

use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Options for [`crate::present::render_image`].
///
/// # Example
/// ```rust
/// use inline_artifacts::ImageRenderOptions;
///
/// let options = ImageRenderOptions::builder()
///     .width(320)
///     .height(240)
///     .download(true)
///     .download_type("jpg")
///     .build()
///     .unwrap();
/// assert_eq!(options.download_name, "myimg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRenderOptions {
    /// Maximum display width in pixels. Default: 200.
    pub width: u32,

    /// Maximum display height in pixels. Default: 200.
    pub height: u32,

    /// Display the image at full resolution instead of shrinking it. Default: false.
    pub original_size: bool,

    /// Also produce a download link for the full-resolution image. Default: false.
    pub download: bool,

    /// Link text of the download anchor. Default: "Download Image".
    pub download_text: String,

    /// File name of the download, without extension. Default: "myimg".
    pub download_name: String,

    /// Re-encoding type (`png`, `jpg`, `tif`, `ico`, …). `None` encodes as PNG.
    ///
    /// Applies to the displayed image and the download alike. Types with no
    /// raster encoder (`svg`, `webp`, unknown names) fall back to PNG.
    pub download_type: Option<String>,
}

impl Default for ImageRenderOptions {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            original_size: false,
            download: false,
            download_text: "Download Image".to_string(),
            download_name: "myimg".to_string(),
            download_type: None,
        }
    }
}

impl ImageRenderOptions {
    pub fn builder() -> ImageRenderOptionsBuilder {
        ImageRenderOptionsBuilder {
            options: Self::default(),
        }
    }
}

/// Builder for [`ImageRenderOptions`].
#[derive(Debug)]
pub struct ImageRenderOptionsBuilder {
    options: ImageRenderOptions,
}

impl ImageRenderOptionsBuilder {
    pub fn width(mut self, px: u32) -> Self {
        self.options.width = px;
        self
    }

    pub fn height(mut self, px: u32) -> Self {
        self.options.height = px;
        self
    }

    pub fn original_size(mut self, v: bool) -> Self {
        self.options.original_size = v;
        self
    }

    pub fn download(mut self, v: bool) -> Self {
        self.options.download = v;
        self
    }

    pub fn download_text(mut self, text: impl Into<String>) -> Self {
        self.options.download_text = text.into();
        self
    }

    pub fn download_name(mut self, name: impl Into<String>) -> Self {
        self.options.download_name = name.into();
        self
    }

    pub fn download_type(mut self, file_type: impl Into<String>) -> Self {
        self.options.download_type = Some(file_type.into());
        self
    }

    /// Build the options, rejecting a zero-sized display box.
    pub fn build(self) -> Result<ImageRenderOptions, ArtifactError> {
        let o = &self.options;
        if o.width == 0 || o.height == 0 {
            return Err(ArtifactError::InvalidConfig(format!(
                "Display size must be at least 1×1, got {}×{}",
                o.width, o.height
            )));
        }
        Ok(self.options)
    }
}

/// Names that select a spreadsheet download instead of CSV.
pub const SPREADSHEET_ALIASES: &[&str] = &["excel", "xlsx", "xls", "xlsm", "xlsb", "odf", "ods", "odt"];

/// File format of a table download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDownloadFormat {
    /// Comma-separated text (default).
    #[default]
    Csv,
    /// An `.xlsx` workbook. Every spreadsheet alias maps here.
    Spreadsheet,
}

impl TableDownloadFormat {
    /// Map a requested type to a download format: any spreadsheet alias
    /// (case-insensitive) is [`TableDownloadFormat::Spreadsheet`], everything else CSV.
    pub fn from_alias(requested: &str) -> Self {
        let requested = requested.trim().trim_start_matches('.').to_ascii_lowercase();
        if SPREADSHEET_ALIASES.contains(&requested.as_str()) {
            TableDownloadFormat::Spreadsheet
        } else {
            TableDownloadFormat::Csv
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TableDownloadFormat::Csv => "csv",
            TableDownloadFormat::Spreadsheet => "xlsx",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            TableDownloadFormat::Csv => "text/csv",
            TableDownloadFormat::Spreadsheet => crate::pipeline::decode::XLSX_MIME,
        }
    }
}

impl FromStr for TableDownloadFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_alias(s))
    }
}

/// Options for [`crate::present::render_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRenderOptions {
    pub download: bool,
    /// Default: "Download Table".
    pub download_text: String,
    /// Default: "myfile".
    pub download_name: String,
    pub download_format: TableDownloadFormat,
}

impl Default for TableRenderOptions {
    fn default() -> Self {
        Self {
            download: false,
            download_text: "Download Table".to_string(),
            download_name: "myfile".to_string(),
            download_format: TableDownloadFormat::Csv,
        }
    }
}

/// Options for [`crate::present::render_plot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotRenderOptions {
    /// Value of the `<img width='…'>` attribute. Default: 500.
    pub width: u32,

    /// Rasterisation DPI. Range: 1–1200. Default: 100.
    ///
    /// A default-size figure (6.4 × 4.8 in) comes out at 640 × 480 px.
    pub dpi: u32,

    pub download: bool,
    /// Default: "Download Plot".
    pub download_text: String,
    /// Default: "myplot". The download is always a `.png`.
    pub download_name: String,
}

impl Default for PlotRenderOptions {
    fn default() -> Self {
        Self {
            width: 500,
            dpi: 100,
            download: false,
            download_text: "Download Plot".to_string(),
            download_name: "myplot".to_string(),
        }
    }
}

/// Highest rasterisation DPI a plot may be rendered at.
pub const MAX_DPI: u32 = 1200;

impl PlotRenderOptions {
    pub fn builder() -> PlotRenderOptionsBuilder {
        PlotRenderOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Check the numeric knobs. The fields are public, so options built by
    /// hand are re-checked here before rendering.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.width == 0 {
            return Err(ArtifactError::InvalidConfig(
                "Plot width must be ≥ 1".into(),
            ));
        }
        if self.dpi == 0 || self.dpi > MAX_DPI {
            return Err(ArtifactError::InvalidConfig(format!(
                "DPI must be 1–{MAX_DPI}, got {}",
                self.dpi
            )));
        }
        Ok(())
    }
}

/// Builder for [`PlotRenderOptions`].
#[derive(Debug)]
pub struct PlotRenderOptionsBuilder {
    options: PlotRenderOptions,
}

impl PlotRenderOptionsBuilder {
    pub fn width(mut self, px: u32) -> Self {
        self.options.width = px;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.options.dpi = dpi.clamp(1, MAX_DPI);
        self
    }

    pub fn download(mut self, v: bool) -> Self {
        self.options.download = v;
        self
    }

    pub fn download_text(mut self, text: impl Into<String>) -> Self {
        self.options.download_text = text.into();
        self
    }

    pub fn download_name(mut self, name: impl Into<String>) -> Self {
        self.options.download_name = name.into();
        self
    }

    pub fn build(self) -> Result<PlotRenderOptions, ArtifactError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

/// Options for [`crate::present::text_to_download_link`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDownloadOptions {
    /// Default: "myfile".
    pub filename: String,
    /// Default: ".txt". A missing leading dot is added; empty means no extension.
    pub extension: String,
    /// Default: "Download File".
    pub download_text: String,
}

impl Default for TextDownloadOptions {
    fn default() -> Self {
        Self {
            filename: "myfile".to_string(),
            extension: ".txt".to_string(),
            download_text: "Download File".to_string(),
        }
    }
}

impl TextDownloadOptions {
    /// The extension with its leading dot, or `""`.
    pub fn normalized_extension(&self) -> String {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            self.extension.clone()
        } else {
            format!(".{}", self.extension)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_defaults() {
        let o = ImageRenderOptions::default();
        assert_eq!((o.width, o.height), (200, 200));
        assert_eq!(o.download_text, "Download Image");
        assert!(o.download_type.is_none());
    }

    #[test]
    fn image_builder_rejects_zero_box() {
        assert!(matches!(
            ImageRenderOptions::builder().width(0).build(),
            Err(ArtifactError::InvalidConfig(_))
        ));
    }

    #[test]
    fn plot_builder_clamps_dpi() {
        let o = PlotRenderOptions::builder().dpi(0).build().unwrap();
        assert_eq!(o.dpi, 1);
        let o = PlotRenderOptions::builder().dpi(5000).build().unwrap();
        assert_eq!(o.dpi, 1200);
    }

    #[test]
    fn plot_validate_checks_hand_built_options() {
        assert!(PlotRenderOptions::default().validate().is_ok());
        let o = PlotRenderOptions {
            dpi: MAX_DPI + 1,
            ..Default::default()
        };
        assert!(matches!(o.validate(), Err(ArtifactError::InvalidConfig(_))));
    }

    #[test]
    fn plot_builder_rejects_zero_width() {
        assert!(PlotRenderOptions::builder().width(0).build().is_err());
    }

    #[test]
    fn spreadsheet_aliases() {
        for alias in SPREADSHEET_ALIASES {
            assert_eq!(
                TableDownloadFormat::from_alias(alias),
                TableDownloadFormat::Spreadsheet
            );
        }
        assert_eq!(TableDownloadFormat::from_alias("EXCEL"), TableDownloadFormat::Spreadsheet);
        assert_eq!(TableDownloadFormat::from_alias(".xlsx"), TableDownloadFormat::Spreadsheet);
        assert_eq!(TableDownloadFormat::from_alias("csv"), TableDownloadFormat::Csv);
        assert_eq!(TableDownloadFormat::from_alias("parquet"), TableDownloadFormat::Csv);
        assert_eq!("ods".parse::<TableDownloadFormat>(), Ok(TableDownloadFormat::Spreadsheet));
    }

    #[test]
    fn text_extension_gets_dot() {
        let mut o = TextDownloadOptions::default();
        assert_eq!(o.normalized_extension(), ".txt");
        o.extension = "md".into();
        assert_eq!(o.normalized_extension(), ".md");
        o.extension = String::new();
        assert_eq!(o.normalized_extension(), "");
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let o: ImageRenderOptions = serde_json::from_str(r#"{"width": 64, "download": true}"#).unwrap();
        assert_eq!(o.width, 64);
        assert_eq!(o.height, 200);
        assert!(o.download);

        let t: TableRenderOptions = serde_json::from_str(r#"{"download_format": "spreadsheet"}"#).unwrap();
        assert_eq!(t.download_format, TableDownloadFormat::Spreadsheet);
        assert_eq!(t.download_name, "myfile");
    }
}
