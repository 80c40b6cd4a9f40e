//! Zip container for presentation parts.

use std::io::{Cursor, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::slide::SlideDocument;
use crate::style::DEFAULT_FONT_NAME;

use super::parts::{self, Relationships};
use super::shape_xml::slide_xml;

/// Writes named parts into a deflate-compressed zip.
pub struct PackageWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
    parts_written: usize,
}

impl<W: Write + Seek> PackageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            parts_written: 0,
        }
    }

    /// Write one part. `name` is the zip member name, without a leading slash.
    pub fn write_part(&mut self, name: &str, content: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(content)?;
        self.parts_written += 1;
        Ok(())
    }

    pub fn write_rels(&mut self, name: &str, rels: &Relationships) -> Result<()> {
        self.write_part(name, rels.to_xml()?.as_bytes())
    }

    pub fn parts_written(&self) -> usize {
        self.parts_written
    }

    /// Write the central directory and hand back the inner writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

/// Serialize a slide document as a complete `.pptx` package.
pub fn write_package<W: Write + Seek>(doc: &SlideDocument, writer: W) -> Result<W> {
    let slide_count = doc.slide_count();
    let mut package = PackageWriter::new(writer);

    package.write_part(
        "[Content_Types].xml",
        parts::content_types_xml(slide_count)?.as_bytes(),
    )?;
    package.write_rels("_rels/.rels", &parts::package_rels())?;

    package.write_part(
        "docProps/core.xml",
        parts::core_properties_xml(doc.properties())?.as_bytes(),
    )?;
    package.write_part(
        "docProps/app.xml",
        parts::app_properties_xml(slide_count)?.as_bytes(),
    )?;

    package.write_part(
        "ppt/presentation.xml",
        parts::presentation_xml(doc.size(), slide_count)?.as_bytes(),
    )?;
    package.write_rels(
        "ppt/_rels/presentation.xml.rels",
        &parts::presentation_rels(slide_count),
    )?;

    package.write_part(
        "ppt/slideMasters/slideMaster1.xml",
        parts::slide_master_xml()?.as_bytes(),
    )?;
    package.write_rels(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &parts::slide_master_rels(),
    )?;
    package.write_part(
        "ppt/slideLayouts/slideLayout1.xml",
        parts::slide_layout_xml()?.as_bytes(),
    )?;
    package.write_rels(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &parts::slide_layout_rels(),
    )?;
    package.write_part(
        "ppt/theme/theme1.xml",
        parts::theme_xml(DEFAULT_FONT_NAME)?.as_bytes(),
    )?;

    let slide_rels = parts::slide_rels();
    for (index, slide) in doc.slides().iter().enumerate() {
        package.write_part(&parts::slide_part_name(index), slide_xml(slide)?.as_bytes())?;
        package.write_rels(
            &format!("ppt/slides/_rels/slide{}.xml.rels", index + 1),
            &slide_rels,
        )?;
    }

    log::debug!(
        "Wrote presentation package: {} slide(s), {} part(s)",
        slide_count,
        package.parts_written()
    );
    package.finish()
}

/// Serialize a slide document to an in-memory `.pptx`.
pub fn to_bytes(doc: &SlideDocument) -> Result<Vec<u8>> {
    let cursor = write_package(doc, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}
