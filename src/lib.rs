//! # pdfdeck
//!
//! Convert PDF documents into editable PowerPoint (`.pptx`) decks.
//!
//! Every page becomes one slide. Text runs become positioned, styled text
//! boxes, and raster images are analyzed for simple geometric shapes
//! (rectangles, triangles, circles) which are re-created as native slide
//! shapes instead of pixels.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> pdfdeck::Result<()> {
//!     let deck = pdfdeck::convert_file("document.pdf")?;
//!     println!("{} slides", deck.slide_count());
//!     std::fs::write("document.pptx", deck.to_pptx_bytes()?)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`parser`]: page content → [`model::PageContent`] (text runs, raw images)
//! - [`style`]: raw run attributes → fully populated [`style::ResolvedStyle`]
//! - [`shapes`]: raster image → [`shapes::DetectedShape`]s
//! - [`slide`]: page content → [`slide::Slide`], accumulated into a [`SlideDocument`]
//! - [`pptx`]: [`SlideDocument`] → OOXML package
//!
//! [`convert::Converter`] drives the pipeline, optionally building slides in
//! parallel with Rayon.

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pptx;
pub mod shapes;
pub mod slide;
pub mod style;

// Re-export commonly used types
pub use convert::{ConversionStats, ConvertOptions, Converter};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf_bytes, PdfFormat};
pub use error::{Error, Result};
pub use model::{BBox, ImageAsset, ImageFormat, Metadata, PageContent, RawColor, TextRun};
pub use parser::PdfParser;
pub use pptx::PPTX_MIME_TYPE;
pub use shapes::{ClassifierConfig, DetectedShape, ShapeClassifier, ShapeKind};
pub use slide::{
    DeckBuilder, Frame, PresetShape, ShapePlacement, Slide, SlideBuilder, SlideDocument,
    SlideObject, SlideSize,
};
pub use style::{ResolvedStyle, Rgb, StyleDefaults, StyleResolver};

use std::io::Read;
use std::path::Path;

/// Convert PDF bytes with default options.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("document.pdf").unwrap();
/// let deck = pdfdeck::convert_bytes(&data).unwrap();
/// ```
pub fn convert_bytes(data: &[u8]) -> Result<SlideDocument> {
    Converter::default().convert(data)
}

/// Convert a PDF file with default options.
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<SlideDocument> {
    Converter::default().convert_file(path)
}

/// Convert a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfdeck::{convert_file_with_options, ConvertOptions};
///
/// let options = ConvertOptions::sequential();
/// let deck = convert_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn convert_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ConvertOptions,
) -> Result<SlideDocument> {
    Converter::new(options).convert_file(path)
}

/// Convert a PDF from a reader with default options.
pub fn convert_reader<R: Read>(reader: R) -> Result<SlideDocument> {
    Converter::default().convert_reader(reader)
}

/// Convert PDF bytes straight to `.pptx` bytes.
///
/// # Example
///
/// ```no_run
/// let pdf = std::fs::read("document.pdf").unwrap();
/// let pptx = pdfdeck::to_pptx(&pdf).unwrap();
/// std::fs::write("document.pptx", pptx).unwrap();
/// ```
pub fn to_pptx(data: &[u8]) -> Result<Vec<u8>> {
    Converter::default().convert_to_bytes(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_bytes_rejects_garbage() {
        assert!(matches!(convert_bytes(b"hello"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_convert_file_missing() {
        assert!(matches!(
            convert_file("/nonexistent/input.pdf"),
            Err(Error::Io(_))
        ));
    }
}
