//! Error types for the pdfdeck library.

use std::io;
use thiserror::Error;

/// Result type alias for pdfdeck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a PDF into a slide deck.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF document is encrypted. Decryption is not supported.
    #[error("Document is encrypted")]
    Encrypted,

    /// The document, or one of its pages, could not be parsed.
    ///
    /// Always fatal: a missing page would break the page-to-slide
    /// correspondence of the output.
    #[error("PDF parsing error{}: {message}", page_suffix(.page))]
    DocumentParse {
        /// Zero-based index of the offending page, if page-specific.
        page: Option<usize>,
        /// Description of the failure.
        message: String,
    },

    /// An embedded image could not be decoded.
    ///
    /// Recovered per image by the converter: the image yields no shapes.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Writing the presentation package failed.
    #[error("Package error: {0}")]
    Package(String),
}

fn page_suffix(page: &Option<usize>) -> String {
    page.map(|p| format!(" on page {}", p)).unwrap_or_default()
}

impl Error {
    /// Create a document-level parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::DocumentParse {
            page: None,
            message: message.into(),
        }
    }

    /// Create a parse error attributed to a specific page.
    pub fn page_parse(page: usize, message: impl Into<String>) -> Self {
        Error::DocumentParse {
            page: Some(page),
            message: message.into(),
        }
    }

    /// Attach a page index to a parse error that has none.
    pub fn at_page(self, page: usize) -> Self {
        match self {
            Error::DocumentParse {
                page: None,
                message,
            } => Error::DocumentParse {
                page: Some(page),
                message,
            },
            other => other,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::parse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecode(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Package(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::Package(format!("XML formatting failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::page_parse(3, "bad content stream");
        assert_eq!(
            err.to_string(),
            "PDF parsing error on page 3: bad content stream"
        );

        let err = Error::parse("no trailer");
        assert_eq!(err.to_string(), "PDF parsing error: no trailer");
    }

    #[test]
    fn test_at_page_only_fills_missing_index() {
        let err = Error::parse("broken").at_page(2);
        assert!(matches!(err, Error::DocumentParse { page: Some(2), .. }));

        let err = Error::page_parse(5, "broken").at_page(2);
        assert!(matches!(err, Error::DocumentParse { page: Some(5), .. }));

        let err = Error::ImageDecode("x".into()).at_page(1);
        assert!(matches!(err, Error::ImageDecode(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
