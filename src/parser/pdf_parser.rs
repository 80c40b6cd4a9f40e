//! PDF document parser using lopdf.

use std::io::Read;
use std::path::Path;

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{parse_pdf_date, Metadata, PageContent};

use super::backend::{LopdfBackend, PageId, PdfBackend, Scope};
use super::content::ContentInterpreter;
use super::images::collect_images;

/// PDF page extractor.
///
/// Loads a document once and extracts pages on demand.
pub struct PdfParser {
    backend: LopdfBackend,
    page_ids: Vec<PageId>,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        // Verify it's a PDF
        detect_format_from_bytes(data)?;

        let backend = LopdfBackend::load_bytes(data)?;
        let page_ids = backend.pages().into_values().collect();
        Ok(Self { backend, page_ids })
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.backend.version()
    }

    /// Extract document metadata.
    pub fn metadata(&self) -> Metadata {
        let doc = self.backend.raw_doc();
        let mut metadata = Metadata::with_version(self.version());
        metadata.page_count = self.page_ids.len() as u32;

        let info = doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|info| match info {
                lopdf::Object::Reference(r) => doc.get_dictionary(*r).ok(),
                lopdf::Object::Dictionary(d) => Some(d),
                _ => None,
            });

        if let Some(info_dict) = info {
            metadata.title = get_string_from_dict(info_dict, b"Title");
            metadata.author = get_string_from_dict(info_dict, b"Author");
            metadata.subject = get_string_from_dict(info_dict, b"Subject");
            metadata.keywords = get_string_from_dict(info_dict, b"Keywords");
            metadata.creator = get_string_from_dict(info_dict, b"Creator");
            metadata.producer = get_string_from_dict(info_dict, b"Producer");

            // Parse dates
            if let Some(date_str) = get_string_from_dict(info_dict, b"CreationDate") {
                metadata.created = parse_pdf_date(&date_str);
            }
            if let Some(date_str) = get_string_from_dict(info_dict, b"ModDate") {
                metadata.modified = parse_pdf_date(&date_str);
            }
        }

        metadata
    }

    /// Width and height of a page's MediaBox in points.
    pub fn page_size(&self, index: usize) -> Result<(f64, f64)> {
        let page_id = *self
            .page_ids
            .get(index)
            .ok_or_else(|| Error::page_parse(index, "page index out of range"))?;
        let media_box = self
            .backend
            .media_box(page_id)
            .map_err(|e| e.at_page(index))?;
        Ok((media_box[2] - media_box[0], media_box[3] - media_box[1]))
    }

    /// Extract the text runs and images of one page (zero-based index).
    ///
    /// Any failure is reported as [`Error::DocumentParse`] carrying the page
    /// index; a page is never silently skipped.
    pub fn extract_page(&self, index: usize) -> Result<PageContent> {
        let page_id = *self.page_ids.get(index).ok_or_else(|| {
            Error::page_parse(
                index,
                format!("page index out of range ({} pages)", self.page_ids.len()),
            )
        })?;

        self.extract_page_inner(index, page_id).map_err(|e| match e {
            Error::DocumentParse { .. } => e.at_page(index),
            Error::Io(_) | Error::Encrypted => e,
            other => Error::page_parse(index, other.to_string()),
        })
    }

    fn extract_page_inner(&self, index: usize, page_id: PageId) -> Result<PageContent> {
        let media_box = self.backend.media_box(page_id)?;
        let scope = Scope::Page(page_id);

        let layout = ContentInterpreter::new(&self.backend).run_page(scope)?;
        let placements = layout.image_placements(media_box);

        let mut page = PageContent::new(
            index,
            media_box[2] - media_box[0],
            media_box[3] - media_box[1],
        );
        page.runs = layout.text_runs(media_box);
        page.images = collect_images(&self.backend, scope, &placements)?;

        log::debug!(
            "Page {}: {} text run(s), {} image(s)",
            index,
            page.runs.len(),
            page.images.len()
        );
        Ok(page)
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    let value = match dict.get(key).ok()? {
        lopdf::Object::String(bytes, _) => {
            // Try UTF-16BE first (PDF standard for Unicode)
            if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
                let utf16: Vec<u16> = rest
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                // Try as UTF-8, then Latin-1
                String::from_utf8(bytes.clone())
                    .ok()
                    .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
            }
        }
        lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    };
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object};

    #[test]
    fn test_get_string_from_dict() {
        let dict = dictionary! {
            "Title" => Object::string_literal("Quarterly"),
            "Author" => Object::String(vec![0xFE, 0xFF, 0x00, 0x41], lopdf::StringFormat::Hexadecimal),
            "Empty" => Object::string_literal("  "),
            "Count" => 3,
        };
        assert_eq!(get_string_from_dict(&dict, b"Title").as_deref(), Some("Quarterly"));
        assert_eq!(get_string_from_dict(&dict, b"Author").as_deref(), Some("A"));
        assert_eq!(get_string_from_dict(&dict, b"Empty"), None);
        assert_eq!(get_string_from_dict(&dict, b"Count"), None);
        assert_eq!(get_string_from_dict(&dict, b"Missing"), None);
    }

    #[test]
    fn test_rejects_non_pdf() {
        assert!(matches!(
            PdfParser::from_bytes(b"GIF89a......"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_rejects_truncated_pdf() {
        assert!(PdfParser::from_bytes(b"%PDF-1.7\n1 0 obj\n<<").is_err());
    }
}
