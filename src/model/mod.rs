//! Source-side model: what the page extractor reads out of a PDF.
//!
//! These types describe one page at a time. They carry raw, unvalidated
//! attributes; the style resolver and shape classifier turn them into
//! something a slide can use.

mod document;
mod image;
mod page;

pub use document::{parse_pdf_date, Metadata};
pub use image::{detect_mime_type, ColorModel, ImageAsset, ImageFormat, Predictor, SampleLayout};
pub use page::{BBox, PageContent, RawColor, TextRun};
