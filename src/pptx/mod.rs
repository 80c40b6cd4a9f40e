//! OOXML presentation (`.pptx`) serialization.
//!
//! The package holds one slide master, one blank layout and one theme
//! shared by every slide. Slide objects are written as DrawingML shapes with
//! explicit positions in EMUs.

mod package;
pub mod parts;
mod shape_xml;

pub use package::{to_bytes, write_package, PackageWriter};
pub use shape_xml::slide_xml;

/// MIME type of a `.pptx` file.
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
