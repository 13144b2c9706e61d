//! Plot surfaces: anything that can rasterise itself to PNG at a given DPI.
//!
//! The presenter never owns or reaches for an ambient "current figure".
//! Callers construct a surface and hand it over explicitly. Two surfaces
//! ship with the crate:
//!
//! * [`Figure`] — a `plotters` drawing closure sized in inches, rasterised
//!   onto an in-memory RGB bitmap at `inches × dpi` pixels;
//! * `DynamicImage` — an already-rasterised canvas (the DPI is ignored).

use crate::error::ArtifactError;
use crate::pipeline::image::encode;
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt;
use tracing::debug;

/// Largest raster [`Figure::rasterize`] will allocate: a 6.4 × 4.8 in
/// figure at 1200 DPI fits, a runaway size does not.
pub const MAX_RASTER_PIXELS: usize = 100_000_000;

/// Result type returned by [`Figure`] drawing closures.
pub type DrawResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type DrawFn = Box<dyn for<'a> Fn(&DrawingArea<BitMapBackend<'a>, Shift>) -> DrawResult>;

/// A drawing target that can be serialised to PNG bytes.
pub trait PlotSurface {
    /// Rasterise at `dpi` dots per inch and PNG-encode the result.
    fn to_png(&self, dpi: u32) -> Result<Vec<u8>, ArtifactError>;

    /// Release whatever the surface holds. Called once rendering is done.
    fn close(&mut self) {}
}

/// A raster figure drawn with `plotters`.
///
/// ```rust
/// use inline_artifacts::pipeline::plot::{Figure, PlotSurface};
/// use plotters::prelude::*;
///
/// let figure = Figure::new(|area| {
///     area.fill(&WHITE)?;
///     area.draw(&Circle::new((50, 50), 20, RED.filled()))?;
///     Ok(())
/// })
/// .with_size(2.0, 1.0);
///
/// assert_eq!(figure.size_at(100), (200, 100));
/// let png = figure.to_png(100).unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
pub struct Figure {
    width_in: f64,
    height_in: f64,
    draw: Option<DrawFn>,
}

impl Figure {
    /// Figure size used when none is given, in inches.
    pub const DEFAULT_SIZE_IN: (f64, f64) = (6.4, 4.8);

    pub fn new<F>(draw: F) -> Self
    where
        F: for<'a> Fn(&DrawingArea<BitMapBackend<'a>, Shift>) -> DrawResult + 'static,
    {
        let (width_in, height_in) = Self::DEFAULT_SIZE_IN;
        Self {
            width_in,
            height_in,
            draw: Some(Box::new(draw)),
        }
    }

    /// Set the figure size in inches. Non-positive sizes are ignored.
    pub fn with_size(mut self, width_in: f64, height_in: f64) -> Self {
        if width_in > 0.0 && height_in > 0.0 {
            self.width_in = width_in;
            self.height_in = height_in;
        }
        self
    }

    /// Pixel size of the raster at `dpi`.
    pub fn size_at(&self, dpi: u32) -> (u32, u32) {
        let px = |inches: f64| ((inches * f64::from(dpi)).round() as u32).max(1);
        (px(self.width_in), px(self.height_in))
    }

    pub fn is_closed(&self) -> bool {
        self.draw.is_none()
    }

    /// Run the drawing closure on a white RGB bitmap.
    pub fn rasterize(&self, dpi: u32) -> Result<RgbImage, ArtifactError> {
        let draw = self
            .draw
            .as_ref()
            .ok_or_else(|| ArtifactError::Plot("figure has been closed".to_string()))?;

        let (width, height) = self.size_at(dpi);
        let len = (width as usize)
            .checked_mul(height as usize)
            .filter(|&px| px <= MAX_RASTER_PIXELS)
            .and_then(|px| px.checked_mul(3))
            .ok_or_else(|| {
                ArtifactError::Plot(format!(
                    "{width}x{height} px at {dpi} dpi exceeds the {MAX_RASTER_PIXELS} pixel limit"
                ))
            })?;
        let mut buf = vec![255u8; len];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            draw(&root).map_err(|e| ArtifactError::Plot(e.to_string()))?;
            root.present()
                .map_err(|e| ArtifactError::Plot(e.to_string()))?;
        }
        debug!("Rasterised figure at {} dpi → {}x{} px", dpi, width, height);

        RgbImage::from_raw(width, height, buf)
            .ok_or_else(|| ArtifactError::Plot("raster buffer size mismatch".to_string()))
    }
}

impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure")
            .field("width_in", &self.width_in)
            .field("height_in", &self.height_in)
            .field("draw", &self.draw.as_ref().map(|_| "<draw fn>"))
            .finish()
    }
}

impl PlotSurface for Figure {
    fn to_png(&self, dpi: u32) -> Result<Vec<u8>, ArtifactError> {
        let raster = DynamicImage::ImageRgb8(self.rasterize(dpi)?);
        encode(&raster, ImageFormat::Png)
    }

    fn close(&mut self) {
        self.draw = None;
    }
}

impl PlotSurface for DynamicImage {
    fn to_png(&self, _dpi: u32) -> Result<Vec<u8>, ArtifactError> {
        encode(self, ImageFormat::Png)
    }
}
