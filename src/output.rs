//! Output types returned by the presenter and by [`crate::convert::inspect`].

use serde::Serialize;
use std::fmt;

/// An HTML fragment ready to embed in a page, plus an optional download anchor.
///
/// `download` is `Some` exactly when the caller asked for a download link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedHtml {
    /// The display element (`<img …>` or `<table …>`).
    pub display: String,
    /// The `<a href='data:…' download='…'>` anchor, when requested.
    pub download: Option<String>,
}

impl RenderedHtml {
    pub fn display_only(display: String) -> Self {
        Self {
            display,
            download: None,
        }
    }

    pub fn with_download(display: String, download: String) -> Self {
        Self {
            display,
            download: Some(download),
        }
    }

    pub fn has_download(&self) -> bool {
        self.download.is_some()
    }

    /// Split into `(display, download)`.
    pub fn into_parts(self) -> (String, Option<String>) {
        (self.display, self.download)
    }
}

impl fmt::Display for RenderedHtml {
    /// The display element, followed by the download anchor on its own line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)?;
        if let Some(ref download) = self.download {
            write!(f, "\n{download}")?;
        }
        Ok(())
    }
}

/// What an uploaded data URI contains, without rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactInfo {
    /// MIME type from the data-URI prefix, if any.
    pub mime_type: Option<String>,
    /// Short type tag (`csv`, `jpeg`, `xlsx`, …); empty when unknown.
    pub file_type: String,
    /// Canonical extension (`.jpg`, …), if the MIME type is registered.
    pub file_extension: Option<String>,
    /// Decoded payload size in bytes.
    pub byte_len: usize,
    /// `(width, height)` when the payload decodes as an image.
    pub image_dimensions: Option<(u32, u32)>,
    /// Native image format name (`Jpeg`, `Png`, …) when the payload decodes as an image.
    pub image_format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_parts() {
        let html = RenderedHtml::with_download("<img src='x'>".into(), "<a href='x'>d</a>".into());
        assert_eq!(html.to_string(), "<img src='x'>\n<a href='x'>d</a>");
        assert!(html.has_download());

        let html = RenderedHtml::display_only("<img src='x'>".into());
        assert_eq!(html.to_string(), "<img src='x'>");
        assert_eq!(html.into_parts(), ("<img src='x'>".to_string(), None));
    }

    #[test]
    fn serialises_to_json() {
        let html = RenderedHtml::display_only("<table></table>".into());
        let json = serde_json::to_string(&html).unwrap();
        assert_eq!(json, r#"{"display":"<table></table>","download":null}"#);
    }
}
