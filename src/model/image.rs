//! Embedded raster images as stored in the PDF.

use super::BBox;

/// An image XObject extracted from a page.
///
/// `data` holds the stream bytes exactly as stored in the file; decoding
/// happens later, in memory, and only for shape classification.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Raw stream bytes (still filter-encoded)
    pub data: Vec<u8>,

    /// Declared encoding of `data`
    pub format: ImageFormat,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Where the image is painted on the page, in points (top-left origin),
    /// if the page content draws it
    pub placement: Option<BBox>,
}

impl ImageAsset {
    /// Create an asset with no recorded placement.
    pub fn new(data: Vec<u8>, format: ImageFormat, width: u32, height: u32) -> Self {
        Self {
            data,
            format,
            width,
            height,
            placement: None,
        }
    }

    /// Set the on-page placement.
    pub fn with_placement(mut self, placement: BBox) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Create an asset from a self-describing encoded image (PNG, JPEG, ...).
    ///
    /// Dimensions are left at zero; they are recovered on decode.
    pub fn encoded(data: Vec<u8>) -> Self {
        let format = match detect_mime_type(&data) {
            Some("image/jpeg") => ImageFormat::Jpeg,
            Some(mime) => ImageFormat::Encoded(mime),
            None => ImageFormat::Unsupported("unrecognized image data".to_string()),
        };
        Self::new(data, format, 0, 0)
    }

    /// Size of the stored stream in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// How an image stream is encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageFormat {
    /// Baseline or progressive JPEG (`DCTDecode`)
    Jpeg,
    /// JPEG 2000 (`JPXDecode`)
    Jpeg2000,
    /// Zlib-compressed samples (`FlateDecode`)
    Flate(SampleLayout),
    /// Uncompressed samples
    Raw(SampleLayout),
    /// A self-describing container recognized by its magic bytes
    Encoded(&'static str),
    /// Any other filter chain (CCITT, JBIG2, LZW, ...)
    Unsupported(String),
}

impl ImageFormat {
    /// Short human-readable tag.
    pub fn tag(&self) -> &str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Jpeg2000 => "jpx",
            ImageFormat::Flate(_) => "flate",
            ImageFormat::Raw(_) => "raw",
            ImageFormat::Encoded(mime) => mime.strip_prefix("image/").unwrap_or(mime),
            ImageFormat::Unsupported(filter) => filter,
        }
    }
}

/// Layout of uncompressed image samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleLayout {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u8,
    pub color: ColorModel,
    /// PNG predictor from `DecodeParms`, if any (`Predictor >= 10`)
    pub predictor: Option<Predictor>,
}

impl SampleLayout {
    /// Number of color components per pixel.
    pub fn components(&self) -> usize {
        self.color.components()
    }

    /// Bytes in one row of packed samples.
    pub fn row_bytes(&self) -> usize {
        (self.width as usize * self.components() * self.bits_per_component as usize).div_ceil(8)
    }
}

/// Color model of image samples.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
    /// Palette lookup into RGB triples.
    Indexed { palette: Vec<u8> },
}

impl ColorModel {
    /// Number of components stored per pixel.
    pub fn components(&self) -> usize {
        match self {
            ColorModel::Gray | ColorModel::Indexed { .. } => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
        }
    }
}

/// PNG-style row predictor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predictor {
    pub colors: usize,
    pub bits_per_component: usize,
    pub columns: usize,
}

/// Detect the MIME type of an encoded image from its magic bytes.
pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    // JPEG 2000: 00 00 00 0C 6A 50 20 20
    if data.starts_with(&[0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20]) {
        return Some("image/jp2");
    }

    None
}
