//! Image conversion: byte buffer → `ImageArtifact`, and `DynamicImage` → encoded bytes.
//!
//! The native format is sniffed from the magic bytes rather than trusted
//! from the upload's MIME type. Browsers report `image/jpeg` for `.jfif`
//! files and `application/octet-stream` for anything they do not recognise.

use crate::error::ArtifactError;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{BufRead, Cursor, Seek};
use tracing::debug;

/// A decoded raster image together with the format it was stored in.
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    image: DynamicImage,
    format: ImageFormat,
}

impl ImageArtifact {
    pub fn new(image: DynamicImage, format: ImageFormat) -> Self {
        Self { image, format }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_inner(self) -> DynamicImage {
        self.image
    }

    /// Format the source bytes were encoded in.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// An encodable output type: the MIME subtype written into `data:image/<subtype>`,
/// the encoder behind it, and the extension used for download file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageType {
    pub subtype: &'static str,
    pub format: ImageFormat,
    pub extension: &'static str,
}

impl ImageType {
    pub const PNG: ImageType = ImageType {
        subtype: "png",
        format: ImageFormat::Png,
        extension: "png",
    };

    pub fn mime(&self) -> String {
        format!("image/{}", self.subtype)
    }
}

const ENCODABLE_TYPES: &[ImageType] = &[
    ImageType::PNG,
    ImageType {
        subtype: "jpeg",
        format: ImageFormat::Jpeg,
        extension: "jpg",
    },
    ImageType {
        subtype: "gif",
        format: ImageFormat::Gif,
        extension: "gif",
    },
    ImageType {
        subtype: "bmp",
        format: ImageFormat::Bmp,
        extension: "bmp",
    },
    ImageType {
        subtype: "tiff",
        format: ImageFormat::Tiff,
        extension: "tiff",
    },
    ImageType {
        subtype: "x-icon",
        format: ImageFormat::Ico,
        extension: "ico",
    },
];

/// Normalise a requested image type to a MIME subtype.
///
/// Lower-cases, drops dots, and applies the aliases
/// `jpg→jpeg`, `tif→tiff`, `ico→x-icon`, `svg→svg+xml`.
pub fn normalize_image_subtype(requested: &str) -> String {
    let subtype = requested.trim().to_ascii_lowercase().replace('.', "");
    match subtype.as_str() {
        "jpg" => "jpeg".to_string(),
        "tif" => "tiff".to_string(),
        "ico" => "x-icon".to_string(),
        "svg" => "svg+xml".to_string(),
        _ => subtype,
    }
}

/// Resolve the type images are re-encoded as.
///
/// `None` means PNG. A requested type with no raster encoder behind it
/// (`svg+xml`, `webp`, typos) also resolves to PNG.
pub fn resolve_image_type(requested: Option<&str>) -> ImageType {
    let Some(requested) = requested else {
        return ImageType::PNG;
    };
    let subtype = normalize_image_subtype(requested);
    ENCODABLE_TYPES
        .iter()
        .copied()
        .find(|t| t.subtype == subtype)
        .unwrap_or(ImageType::PNG)
}

/// Open a buffer as a raster image, keeping its native format.
pub fn to_image<R: BufRead + Seek>(buffer: R) -> Result<ImageArtifact, ArtifactError> {
    let reader = ImageReader::new(buffer)
        .with_guessed_format()
        .map_err(|e| ArtifactError::InvalidImage {
            detail: e.to_string(),
        })?;

    let format = reader.format().ok_or_else(|| ArtifactError::InvalidImage {
        detail: "unrecognised image format".to_string(),
    })?;

    let image = reader.decode().map_err(|e| ArtifactError::InvalidImage {
        detail: e.to_string(),
    })?;

    debug!(
        "Opened {:?} image {}x{}",
        format,
        image.width(),
        image.height()
    );

    Ok(ImageArtifact { image, format })
}

/// Shrink `image` to fit within `width × height`, preserving aspect ratio.
///
/// Images already inside the box are returned unchanged (never upscaled).
pub fn fit_within(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if image.width() <= width && image.height() <= height {
        return image.clone();
    }
    image.thumbnail(width.max(1), height.max(1))
}

/// Largest side an ICO entry can have.
pub const ICO_MAX_SIDE: u32 = 256;

/// Encode an image in the given format.
///
/// The pixel layout is converted first where the target encoder is
/// restricted: JPEG has no alpha channel, GIF/ICO/BMP want 8-bit RGBA,
/// TIFF has no grey+alpha layout. ICO output is also shrunk to fit
/// within 256×256.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ArtifactError> {
    let converted;
    let target = match format {
        ImageFormat::Jpeg => {
            converted = DynamicImage::ImageRgb8(image.to_rgb8());
            &converted
        }
        ImageFormat::Ico => {
            let fitted = fit_within(image, ICO_MAX_SIDE, ICO_MAX_SIDE);
            converted = DynamicImage::ImageRgba8(fitted.to_rgba8());
            &converted
        }
        ImageFormat::Gif | ImageFormat::Bmp => {
            converted = DynamicImage::ImageRgba8(image.to_rgba8());
            &converted
        }
        ImageFormat::Tiff => match image {
            DynamicImage::ImageLumaA8(_) => {
                converted = DynamicImage::ImageRgba8(image.to_rgba8());
                &converted
            }
            DynamicImage::ImageLumaA16(_) => {
                converted = DynamicImage::ImageRgba16(image.to_rgba16());
                &converted
            }
            _ => image,
        },
        _ => image,
    };

    let mut buf = Vec::new();
    target
        .write_to(&mut Cursor::new(&mut buf), format)
        .map_err(|e| ArtifactError::ImageEncode {
            format: format!("{format:?}"),
            detail: e.to_string(),
        })?;

    debug!("Encoded {:?} image → {} bytes", format, buf.len());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, ImageBuffer, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    fn red(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn open_png_keeps_format() {
        let bytes = encode(&red(10, 6), ImageFormat::Png).expect("encode should succeed");
        let img = to_image(Cursor::new(bytes)).expect("decode should succeed");
        assert_eq!(img.format(), ImageFormat::Png);
        assert_eq!(img.dimensions(), (10, 6));
    }

    #[test]
    fn open_jpeg_keeps_format() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, Rgb([0, 128, 255])));
        let bytes = encode(&rgb, ImageFormat::Jpeg).unwrap();
        let img = to_image(Cursor::new(bytes)).unwrap();
        assert_eq!(img.format(), ImageFormat::Jpeg);
        assert_eq!(img.dimensions(), (16, 8));
    }

    #[test]
    fn open_webp_upload() {
        let mut bytes = Vec::new();
        red(9, 5)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::WebP)
            .unwrap();
        let img = to_image(Cursor::new(bytes)).unwrap();
        assert_eq!(img.format(), ImageFormat::WebP);
        assert_eq!(img.dimensions(), (9, 5));
    }

    #[test]
    fn garbage_is_invalid_image() {
        let err = to_image(Cursor::new(b"A,B,C\n1,2,3\n".to_vec())).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidImage { .. }));
    }

    #[test]
    fn truncated_png_is_invalid_image() {
        let mut bytes = encode(&red(32, 32), ImageFormat::Png).unwrap();
        bytes.truncate(20);
        assert!(matches!(
            to_image(Cursor::new(bytes)),
            Err(ArtifactError::InvalidImage { .. })
        ));
    }

    #[test]
    fn jpeg_encode_drops_alpha() {
        let bytes = encode(&red(4, 4), ImageFormat::Jpeg).expect("rgba → jpeg should succeed");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn ico_encode_fits_256() {
        let bytes = encode(&red(640, 480), ImageFormat::Ico).unwrap();
        let img = to_image(Cursor::new(bytes)).unwrap();
        assert_eq!(img.format(), ImageFormat::Ico);
        assert_eq!(img.dimensions(), (256, 192));

        let bytes = encode(&red(32, 16), ImageFormat::Ico).unwrap();
        assert_eq!(to_image(Cursor::new(bytes)).unwrap().dimensions(), (32, 16));
    }

    #[test]
    fn tiff_encode_accepts_grey_alpha() {
        let la8 = DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(10, 10, LumaA([90, 200])));
        let bytes = encode(&la8, ImageFormat::Tiff).unwrap();
        let img = to_image(Cursor::new(bytes)).unwrap();
        assert_eq!(img.format(), ImageFormat::Tiff);
        assert_eq!(img.dimensions(), (10, 10));

        let la16 = DynamicImage::ImageLumaA16(ImageBuffer::from_pixel(4, 4, LumaA([1000u16, 65535])));
        assert!(encode(&la16, ImageFormat::Tiff).is_ok());
    }

    #[test]
    fn fit_within_shrinks_preserving_ratio() {
        let out = fit_within(&red(400, 100), 200, 200);
        assert_eq!((out.width(), out.height()), (200, 50));
        let out = fit_within(&red(100, 400), 200, 200);
        assert_eq!((out.width(), out.height()), (50, 200));
    }

    #[test]
    fn fit_within_never_upscales() {
        let out = fit_within(&red(50, 20), 200, 200);
        assert_eq!((out.width(), out.height()), (50, 20));
    }

    #[test]
    fn type_aliases() {
        assert_eq!(normalize_image_subtype("JPG"), "jpeg");
        assert_eq!(normalize_image_subtype(".tif"), "tiff");
        assert_eq!(normalize_image_subtype("ico"), "x-icon");
        assert_eq!(normalize_image_subtype("svg"), "svg+xml");
        assert_eq!(normalize_image_subtype("gif"), "gif");
    }

    #[test]
    fn resolve_defaults_to_png() {
        assert_eq!(resolve_image_type(None), ImageType::PNG);
        assert_eq!(resolve_image_type(Some("svg")), ImageType::PNG);
        assert_eq!(resolve_image_type(Some("nonsense")), ImageType::PNG);

        let jpeg = resolve_image_type(Some("jpg"));
        assert_eq!(jpeg.format, ImageFormat::Jpeg);
        assert_eq!(jpeg.mime(), "image/jpeg");
        assert_eq!(jpeg.extension, "jpg");

        let ico = resolve_image_type(Some(".ICO"));
        assert_eq!(ico.mime(), "image/x-icon");
    }
}
