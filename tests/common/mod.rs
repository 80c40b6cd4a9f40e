//! In-memory PDF fixtures built with lopdf.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use zip::ZipArchive;

/// One page of a fixture document.
#[derive(Default)]
pub struct FixturePage {
    pub content: String,
    /// `(resource name, BaseFont)`
    pub fonts: Vec<(String, String)>,
    /// `(resource name, image stream)`
    pub images: Vec<(String, Stream)>,
}

impl FixturePage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_font(mut self, name: &str, base_font: &str) -> Self {
        self.fonts.push((name.to_string(), base_font.to_string()));
        self
    }

    pub fn with_image(mut self, name: &str, stream: Stream) -> Self {
        self.images.push((name.to_string(), stream));
        self
    }
}

/// A US Letter page showing `text` in Helvetica at the given baseline.
pub fn text_page(text: &str, x: f64, y: f64) -> FixturePage {
    FixturePage::new(format!("BT /F1 12 Tf {} {} Td ({}) Tj ET", x, y, text))
        .with_font("F1", "Helvetica")
}

/// Build a PDF with US Letter pages and an optional document title.
pub fn build_pdf(pages: Vec<FixturePage>, title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for page in pages {
        let mut fonts = Dictionary::new();
        for (name, base_font) in page.fonts {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => Object::Name(base_font.into_bytes()),
            });
            fonts.set(name.into_bytes(), Object::Reference(font_id));
        }

        let mut xobjects = Dictionary::new();
        for (name, stream) in page.images {
            let image_id = doc.add_object(stream);
            xobjects.set(name.into_bytes(), Object::Reference(image_id));
        }

        let content_id = doc.add_object(Stream::new(dictionary! {}, page.content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => fonts,
                "XObject" => xobjects,
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Author" => Object::string_literal("Fixture"),
            "CreationDate" => Object::string_literal("D:20240115103000Z"),
        });
        doc.trailer.set("Info", Object::Reference(info_id));
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// 8-bit gray pixels: black background with a white filled rectangle
/// covering columns `x0..x1` and rows `y0..y1`.
pub fn gray_rect_pixels(width: u32, height: u32, rect: (u32, u32, u32, u32)) -> Vec<u8> {
    let (x0, y0, x1, y1) = rect;
    let mut pixels = vec![0u8; (width * height) as usize];
    for y in y0..y1 {
        for x in x0..x1 {
            pixels[(y * width + x) as usize] = 255;
        }
    }
    pixels
}

fn image_dict(width: u32, height: u32) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceGray",
        "BitsPerComponent" => 8i64,
    }
}

/// Uncompressed DeviceGray image XObject.
pub fn raw_gray_image(width: u32, height: u32, pixels: Vec<u8>) -> Stream {
    Stream::new(image_dict(width, height), pixels)
}

/// FlateDecode DeviceGray image XObject.
pub fn flate_gray_image(width: u32, height: u32, pixels: &[u8]) -> Stream {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(pixels).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut dict = image_dict(width, height);
    dict.set("Filter", "FlateDecode");
    Stream::new(dict, compressed)
}

/// A DCTDecode image whose bytes are not a JPEG.
pub fn corrupt_jpeg_image() -> Stream {
    let mut dict = image_dict(16, 16);
    dict.set("Filter", "DCTDecode");
    Stream::new(dict, vec![0xFF, 0xD8, 0xFF, 0x00, 0x13, 0x37, 0xBE, 0xEF])
}

/// Read one member of a `.pptx` as a string.
pub fn read_part(pptx: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(pptx)).unwrap();
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

/// Names of all slide parts in a `.pptx`.
pub fn slide_parts(pptx: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(pptx)).unwrap();
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}
