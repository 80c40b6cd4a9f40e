//! PDF header sniffing.
//!
//! Input is checked before it is handed to the PDF parser so that obviously
//! foreign data (HTML error pages, zip files, empty uploads) fails fast with
//! [`Error::UnknownFormat`] instead of a parser-specific message.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Detect the PDF version from the leading bytes of a document.
///
/// # Example
/// ```
/// use pdfdeck::detect::detect_format_from_bytes;
///
/// let format = detect_format_from_bytes(b"%PDF-1.7\n...").unwrap();
/// assert_eq!(format.version, "1.7");
/// ```
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    let rest = data.strip_prefix(PDF_MAGIC).ok_or(Error::UnknownFormat)?;
    let version = rest.get(..VERSION_LEN).ok_or(Error::UnknownFormat)?;

    match version {
        [major @ b'1'..=b'2', b'.', minor] if minor.is_ascii_digit() => Ok(PdfFormat {
            version: format!("{}.{}", *major as char, *minor as char),
        }),
        _ => Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(version).to_string(),
        )),
    }
}

/// Detect the PDF version of a file on disk.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Check if bytes start with a supported PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let format = detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(format.version, "1.7");
        assert_eq!(format.to_string(), "PDF 1.7");

        let format = detect_format_from_bytes(b"%PDF-2.0\n").unwrap();
        assert_eq!(format.version, "2.0");
    }

    #[test]
    fn test_detect_rejects_foreign_data() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_format_from_bytes(b"PK\x03\x04"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_format_from_bytes(b""),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_too_short() {
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-1"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_bad_version() {
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-9.1\n"),
            Err(Error::UnsupportedVersion(v)) if v == "9.1"
        ));
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-abc"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\n"));
        assert!(!is_pdf_bytes(b"Not a PDF"));
    }
}
