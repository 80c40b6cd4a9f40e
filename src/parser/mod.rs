//! PDF parsing module.
//!
//! [`PdfParser`] reads one page at a time into a [`PageContent`](crate::model::PageContent):
//! positioned text runs from the content stream and the raw image XObjects
//! the page references.

pub mod backend;
mod content;
mod images;
mod lexer;
mod pdf_parser;

pub use backend::{LopdfBackend, PdfBackend, Scope};
pub use content::{
    to_page_box, ContentBlock, ContentInterpreter, ImageBlock, Matrix, PageLayout, RunGeometry,
    TextBlock, TextLine, ASCENT, DESCENT,
};
pub use images::collect_images;
pub use pdf_parser::PdfParser;
