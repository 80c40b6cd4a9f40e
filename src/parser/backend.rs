//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from the content interpreter.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::lexer::scan_content;
use crate::error::{Error, Result};
use crate::model::{ColorModel, ImageAsset, ImageFormat, Predictor, SampleLayout};

/// Object identifier: (object number, generation number).
pub type ObjectRef = (u32, u16);

/// Page identifier.
pub type PageId = ObjectRef;

/// Letter size, used when no MediaBox can be found.
pub const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Where resources and content are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A page, with resources inherited through the page tree
    Page(PageId),
    /// A Form XObject, with its own resources
    Form(ObjectRef),
}

/// Font information needed to position text.
#[derive(Debug, Clone, Default)]
pub struct FontMetrics {
    /// Base font name with any subset tag removed (e.g., "Helvetica-Bold").
    pub base_font: Option<String>,
    /// Type0 fonts use two-byte codes.
    pub composite: bool,
    /// First code covered by `widths` (simple fonts).
    pub first_char: u32,
    /// Glyph widths in 1/1000 em (simple fonts).
    pub widths: Vec<f64>,
    /// Per-CID widths from the `W` array (composite fonts).
    pub cid_widths: HashMap<u32, f64>,
    /// Width for codes not otherwise covered.
    pub default_width: Option<f64>,
}

/// Largest CID a two-byte code can select.
pub const MAX_CID: u32 = 0xFFFF;

/// Width used when a font gives no metrics at all (half an em).
pub const FALLBACK_GLYPH_WIDTH: f64 = 500.0;

impl FontMetrics {
    /// Width of a character code in 1/1000 em.
    pub fn glyph_width(&self, code: u32) -> f64 {
        if self.composite {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .or(self.default_width)
                .unwrap_or(1000.0);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .or(self.default_width)
            .unwrap_or(FALLBACK_GLYPH_WIDTH)
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.composite {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32))
                .collect()
        } else {
            bytes.iter().map(|b| *b as u32).collect()
        }
    }
}

/// Kind of a named XObject resource.
#[derive(Debug, Clone, PartialEq)]
pub enum XObjectKind {
    Image,
    /// Form XObject with its `Matrix`
    Form([f64; 6]),
    Other,
}

/// A named XObject in a resource dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct XObjectEntry {
    pub name: Vec<u8>,
    pub id: ObjectRef,
    pub kind: XObjectKind,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f64),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Numeric operand at `index`, if present.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.operands.get(index).and_then(get_number_from_value)
    }

    /// All operands as numbers, skipping anything else.
    pub fn numbers(&self) -> Vec<f64> {
        self.operands.iter().filter_map(get_number_from_value).collect()
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, resources, content stream
/// decoding, and text decoding without exposing any concrete PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Page MediaBox as `[llx, lly, urx, ury]`.
    fn media_box(&self, page: PageId) -> Result<[f64; 4]>;

    /// Fonts available in a scope, keyed by resource name.
    fn fonts(&self, scope: Scope) -> Result<HashMap<Vec<u8>, FontMetrics>>;

    /// Raw (decompressed) content stream bytes of a page or form.
    fn content(&self, scope: Scope) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        decode_operations(data)
    }

    /// Decode a text byte sequence using the font's encoding in the given scope.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, scope: Scope, font_name: &[u8], bytes: &[u8]) -> String;

    /// XObjects named by a scope's resources, in listing order.
    fn xobjects(&self, scope: Scope) -> Result<Vec<XObjectEntry>>;

    /// Read an image XObject without decoding its samples.
    fn image(&self, id: ObjectRef) -> Result<ImageAsset>;
}

/// Parse content stream bytes with lopdf's content parser.
///
/// Inline images are skipped. A stream lopdf cannot read to the end is an
/// error rather than a shortened list of operations.
pub fn decode_operations(data: &[u8]) -> Result<Vec<ContentOp>> {
    let mut ops = Vec::new();

    for segment in scan_content(data)? {
        let content = lopdf::content::Content::decode(&data[segment.range.clone()])
            .map_err(|e| Error::parse(e.to_string()))?;
        if content.operations.len() < segment.operators {
            return Err(Error::parse(format!(
                "content stream: unreadable after operator {} of {}",
                ops.len() + content.operations.len(),
                ops.len() + segment.operators
            )));
        }

        ops.extend(content.operations.into_iter().map(|op| ContentOp {
            operator: op.operator,
            operands: op.operands.iter().map(convert_object).collect(),
        }));
    }
    Ok(ops)
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    // Try UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Remove a subset tag such as `ABCDEF+` from a base font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`.
    ///
    /// Escape hatch for operations not covered by `PdfBackend`
    /// (metadata, trailer inspection).
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Follow a reference, if `obj` is one.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj)? {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    /// Look up a page attribute, walking up the page tree for inherited ones.
    fn inherited(&self, page: PageId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page).ok()?;
        // Depth bound guards against cyclic Parent links.
        for _ in 0..32 {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resources(&self, scope: Scope) -> Option<&Dictionary> {
        match scope {
            Scope::Page(page) => self.resolve_dict(self.inherited(page, b"Resources")?),
            Scope::Form(id) => {
                let stream = self.doc.get_object(id).ok()?.as_stream().ok()?;
                self.resolve_dict(stream.dict.get(b"Resources").ok()?)
            }
        }
    }

    fn resource_category(&self, scope: Scope, category: &[u8]) -> Option<&Dictionary> {
        self.resolve_dict(self.resources(scope)?.get(category).ok()?)
    }

    fn font_metrics(&self, font: &Dictionary) -> FontMetrics {
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)).to_string());

        let composite = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|s| s == b"Type0");

        if composite {
            let descendant = font
                .get(b"DescendantFonts")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_array().ok())
                .and_then(|arr| arr.first())
                .and_then(|o| self.resolve_dict(o));

            let default_width = descendant
                .and_then(|d| d.get(b"DW").ok())
                .and_then(|o| self.number(o))
                .or(Some(1000.0));
            let cid_widths = descendant
                .and_then(|d| d.get(b"W").ok())
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_array().ok())
                .map(|w| self.parse_cid_widths(w))
                .unwrap_or_default();

            return FontMetrics {
                base_font,
                composite,
                cid_widths,
                default_width,
                ..Default::default()
            };
        }

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0)
            .max(0) as u32;
        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| arr.iter().map(|w| self.number(w).unwrap_or(0.0)).collect())
            .unwrap_or_default();
        let default_width = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| self.resolve_dict(o))
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(|o| self.number(o))
            .filter(|w| *w > 0.0);

        FontMetrics {
            base_font,
            composite,
            first_char,
            widths,
            default_width,
            ..Default::default()
        }
    }

    /// A CID operand of a `W` array, if it is a whole number in `0..=MAX_CID`.
    fn cid(&self, obj: &Object) -> Option<u32> {
        self.number(obj)
            .filter(|v| v.fract() == 0.0 && (0.0..=MAX_CID as f64).contains(v))
            .map(|v| v as u32)
    }

    /// Parse a CIDFont `W` array: `c [w1 w2 ...]` or `c_first c_last w`.
    ///
    /// Entries outside the two-byte CID range are skipped.
    fn parse_cid_widths(&self, w: &[Object]) -> HashMap<u32, f64> {
        let mut widths = HashMap::new();
        let mut i = 0;
        while i < w.len() {
            let start = self.cid(&w[i]);
            match w.get(i + 1).and_then(|o| self.resolve(o)) {
                Some(Object::Array(list)) => {
                    if let Some(start) = start {
                        for (offset, value) in list.iter().enumerate() {
                            let code = u32::try_from(offset)
                                .ok()
                                .and_then(|o| start.checked_add(o))
                                .filter(|c| *c <= MAX_CID);
                            let Some(code) = code else {
                                break;
                            };
                            if let Some(width) = self.number(value) {
                                widths.insert(code, width);
                            }
                        }
                    }
                    i += 2;
                }
                Some(end) => {
                    if let (Some(start), Some(end)) = (start, self.cid(end)) {
                        let width = w.get(i + 2).and_then(|o| self.number(o)).unwrap_or(1000.0);
                        for code in start..=end {
                            widths.insert(code, width);
                        }
                    }
                    i += 3;
                }
                None => break,
            }
        }
        widths
    }

    fn number(&self, obj: &Object) -> Option<f64> {
        match self.resolve(obj)? {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        }
    }

    fn name_of<'a>(&'a self, obj: &'a Object) -> Option<&'a [u8]> {
        self.resolve(obj)?.as_name().ok()
    }

    /// Map an image `ColorSpace` entry to a color model.
    fn color_model(&self, cs: &Object) -> std::result::Result<ColorModel, String> {
        let cs = self.resolve(cs).ok_or("dangling color space")?;
        if let Ok(name) = cs.as_name() {
            return match name {
                b"DeviceGray" | b"CalGray" | b"G" => Ok(ColorModel::Gray),
                b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(ColorModel::Rgb),
                b"DeviceCMYK" | b"CMYK" => Ok(ColorModel::Cmyk),
                other => Err(format!("ColorSpace {}", String::from_utf8_lossy(other))),
            };
        }

        let arr = cs.as_array().map_err(|_| "malformed color space".to_string())?;
        let family = arr.first().and_then(|o| self.name_of(o)).unwrap_or_default();
        match family {
            b"ICCBased" => {
                let n = arr
                    .get(1)
                    .and_then(|o| self.resolve_dict(o))
                    .and_then(|d| d.get(b"N").ok())
                    .and_then(|o| o.as_i64().ok())
                    .unwrap_or(3);
                match n {
                    1 => Ok(ColorModel::Gray),
                    4 => Ok(ColorModel::Cmyk),
                    _ => Ok(ColorModel::Rgb),
                }
            }
            b"CalGray" => Ok(ColorModel::Gray),
            b"CalRGB" | b"Lab" => Ok(ColorModel::Rgb),
            b"Indexed" | b"I" => {
                let base = arr
                    .get(1)
                    .map(|b| self.color_model(b))
                    .transpose()?
                    .unwrap_or(ColorModel::Rgb);
                let lookup = arr
                    .get(3)
                    .and_then(|o| self.resolve(o))
                    .and_then(|o| match o {
                        Object::String(bytes, _) => Some(bytes.clone()),
                        Object::Stream(stream) => stream_bytes(stream).ok(),
                        _ => None,
                    })
                    .ok_or("missing palette")?;
                Ok(ColorModel::Indexed {
                    palette: palette_to_rgb(&base, &lookup),
                })
            }
            other => Err(format!("ColorSpace {}", String::from_utf8_lossy(other))),
        }
    }

    /// Names of the stream's filters, in application order.
    fn filters(&self, dict: &Dictionary) -> Vec<Vec<u8>> {
        match dict.get(b"Filter").ok().and_then(|o| self.resolve(o)) {
            Some(Object::Name(name)) => vec![name.clone()],
            Some(Object::Array(arr)) => arr
                .iter()
                .filter_map(|o| self.name_of(o).map(|n| n.to_vec()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn predictor(&self, dict: &Dictionary, layout: &SampleLayout) -> Option<Predictor> {
        let params = dict.get(b"DecodeParms").ok().and_then(|o| match self.resolve(o)? {
            Object::Array(arr) => arr.first().and_then(|p| self.resolve_dict(p)),
            other => self.resolve_dict(other),
        })?;
        let int = |key: &[u8]| params.get(key).ok().and_then(|o| o.as_i64().ok());
        if int(b"Predictor").unwrap_or(1) < 10 {
            return None;
        }
        Some(Predictor {
            colors: int(b"Colors").unwrap_or(layout.components() as i64).max(1) as usize,
            bits_per_component: int(b"BitsPerComponent")
                .unwrap_or(layout.bits_per_component as i64)
                .max(1) as usize,
            columns: int(b"Columns").unwrap_or(layout.width as i64).max(1) as usize,
        })
    }
}

/// Stream data with its filters removed. Unfiltered streams are returned as stored.
fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::parse(format!("content stream: {}", e)))
}

/// Expand an indexed palette to RGB triples.
fn palette_to_rgb(base: &ColorModel, lookup: &[u8]) -> Vec<u8> {
    match base {
        ColorModel::Gray => lookup.iter().flat_map(|&v| [v, v, v]).collect(),
        ColorModel::Cmyk => lookup
            .chunks_exact(4)
            .flat_map(|c| {
                let k = c[3] as u16;
                let ch = |v: u8| ((255 - v as u16) * (255 - k) / 255) as u8;
                [ch(c[0]), ch(c[1]), ch(c[2])]
            })
            .collect(),
        _ => lookup.to_vec(),
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn media_box(&self, page: PageId) -> Result<[f64; 4]> {
        let Some(array) = self
            .inherited(page, b"MediaBox")
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
        else {
            return Ok(DEFAULT_MEDIA_BOX);
        };

        let values: Vec<f64> = array.iter().filter_map(|o| self.number(o)).collect();
        match values.as_slice() {
            [x0, y0, x1, y1] => Ok([x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)]),
            _ => Err(Error::parse("malformed MediaBox")),
        }
    }

    fn fonts(&self, scope: Scope) -> Result<HashMap<Vec<u8>, FontMetrics>> {
        let mut fonts = HashMap::new();
        if let Some(font_dict) = self.resource_category(scope, b"Font") {
            for (name, obj) in font_dict.iter() {
                if let Some(font) = self.resolve_dict(obj) {
                    fonts.insert(name.clone(), self.font_metrics(font));
                }
            }
        }
        Ok(fonts)
    }

    fn content(&self, scope: Scope) -> Result<Vec<u8>> {
        let page_id = match scope {
            Scope::Form(id) => {
                let stream = self.doc.get_object(id)?.as_stream()?;
                return stream_bytes(stream);
            }
            Scope::Page(page) => page,
        };

        let page_dict = self.doc.get_dictionary(page_id)?;

        // A page without Contents is blank.
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        let streams: Vec<&Object> = match self.resolve(contents) {
            Some(Object::Array(arr)) => arr.iter().collect(),
            Some(other) => vec![other],
            None => return Err(Error::parse("Invalid content stream")),
        };

        let mut content = Vec::new();
        for obj in streams {
            match self.resolve(obj) {
                Some(Object::Stream(s)) => {
                    let data = stream_bytes(s)?;
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
                _ => return Err(Error::parse("Invalid content stream")),
            }
        }
        Ok(content)
    }

    fn decode_text(&self, scope: Scope, font_name: &[u8], bytes: &[u8]) -> String {
        let font = self
            .resource_category(scope, b"Font")
            .and_then(|fonts| fonts.get(font_name).ok())
            .and_then(|o| self.resolve_dict(o));

        if let Some(font_dict) = font {
            if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn xobjects(&self, scope: Scope) -> Result<Vec<XObjectEntry>> {
        let Some(xobj_dict) = self.resource_category(scope, b"XObject") else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for (name, obj) in xobj_dict.iter() {
            // Inline XObject dictionaries are invalid; only references are followed.
            let Ok(id) = obj.as_reference() else {
                continue;
            };
            let Ok(stream) = self.doc.get_object(id).and_then(|o| o.as_stream()) else {
                continue;
            };
            let kind = match stream.dict.get(b"Subtype").ok().and_then(|o| self.name_of(o)) {
                Some(b"Image") => XObjectKind::Image,
                Some(b"Form") => {
                    let mut matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
                    if let Some(values) = stream
                        .dict
                        .get(b"Matrix")
                        .ok()
                        .and_then(|o| self.resolve(o))
                        .and_then(|o| o.as_array().ok())
                    {
                        for (slot, value) in matrix.iter_mut().zip(values) {
                            *slot = self.number(value).unwrap_or(*slot);
                        }
                    }
                    XObjectKind::Form(matrix)
                }
                _ => XObjectKind::Other,
            };
            entries.push(XObjectEntry {
                name: name.clone(),
                id,
                kind,
            });
        }
        Ok(entries)
    }

    fn image(&self, id: ObjectRef) -> Result<ImageAsset> {
        let stream = self.doc.get_object(id)?.as_stream()?;
        let dict = &stream.dict;

        let int = |key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| self.number(o))
                .map(|v| v.max(0.0) as u32)
        };
        let width = int(b"Width").unwrap_or(0);
        let height = int(b"Height").unwrap_or(0);

        let is_mask = dict
            .get(b"ImageMask")
            .ok()
            .and_then(|o| o.as_bool().ok())
            .unwrap_or(false);
        let bits = if is_mask {
            1
        } else {
            int(b"BitsPerComponent").unwrap_or(8) as u8
        };

        let filters = self.filters(dict);
        let data = stream.content.clone();

        let format = match filters.as_slice() {
            [f] if f == b"DCTDecode" || f == b"DCT" => ImageFormat::Jpeg,
            [f] if f == b"JPXDecode" => ImageFormat::Jpeg2000,
            [] | [_] if filters.iter().all(|f| f == b"FlateDecode" || f == b"Fl") => {
                let color = if is_mask {
                    Ok(ColorModel::Gray)
                } else {
                    match dict.get(b"ColorSpace") {
                        Ok(cs) => self.color_model(cs),
                        Err(_) => Ok(ColorModel::Gray),
                    }
                };
                match color {
                    Ok(color) => {
                        let mut layout = SampleLayout {
                            width,
                            height,
                            bits_per_component: bits,
                            color,
                            predictor: None,
                        };
                        if filters.is_empty() {
                            ImageFormat::Raw(layout)
                        } else {
                            layout.predictor = self.predictor(dict, &layout);
                            ImageFormat::Flate(layout)
                        }
                    }
                    Err(reason) => ImageFormat::Unsupported(reason),
                }
            }
            _ => ImageFormat::Unsupported(
                filters
                    .iter()
                    .map(|f| String::from_utf8_lossy(f).to_string())
                    .collect::<Vec<_>>()
                    .join("+"),
            ),
        };

        Ok(ImageAsset::new(data, format, width, height))
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r as f64),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f64> {
    match val {
        PdfValue::Integer(i) => Some(*i as f64),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        // UTF-16BE BOM + "Hi"
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_get_number_from_value() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(42)), Some(42.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(2.5)), Some(2.5));
        assert_eq!(get_number_from_value(&PdfValue::Other), None);
    }

    #[test]
    fn test_strip_subset_prefix() {
        assert_eq!(strip_subset_prefix("ABCDEF+Helvetica"), "Helvetica");
        assert_eq!(strip_subset_prefix("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_prefix("abcdef+Helvetica"), "abcdef+Helvetica");
        assert_eq!(strip_subset_prefix("AB+Font"), "AB+Font");
    }

    #[test]
    fn test_simple_font_widths() {
        let metrics = FontMetrics {
            first_char: 65,
            widths: vec![600.0, 0.0],
            ..Default::default()
        };
        assert_eq!(metrics.glyph_width(65), 600.0);
        // zero width falls through to the fallback
        assert_eq!(metrics.glyph_width(66), FALLBACK_GLYPH_WIDTH);
        assert_eq!(metrics.glyph_width(32), FALLBACK_GLYPH_WIDTH);
    }

    #[test]
    fn test_composite_font_codes_and_widths() {
        let metrics = FontMetrics {
            composite: true,
            cid_widths: HashMap::from([(0x0102, 250.0)]),
            default_width: Some(1000.0),
            ..Default::default()
        };
        assert_eq!(metrics.codes(&[0x01, 0x02, 0x00, 0x41]), vec![0x0102, 0x0041]);
        assert_eq!(metrics.glyph_width(0x0102), 250.0);
        assert_eq!(metrics.glyph_width(0x0041), 1000.0);
    }

    #[test]
    fn test_cid_widths_out_of_range_entries_skipped() {
        let backend = LopdfBackend {
            doc: LopdfDocument::with_version("1.5"),
        };
        let int = Object::Integer;
        let widths = backend.parse_cid_widths(&[
            int(4294967295),
            Object::Array(vec![int(500), int(500)]),
            int(0),
            int(4294967295),
            int(500),
            int(-3),
            Object::Array(vec![int(700)]),
            int(65534),
            Object::Array(vec![int(300), int(310), int(320)]),
            int(10),
            int(12),
            int(250),
        ]);

        assert_eq!(widths.len(), 5);
        assert_eq!(widths[&65534], 300.0);
        assert_eq!(widths[&65535], 310.0);
        assert_eq!(widths[&10], 250.0);
        assert_eq!(widths[&12], 250.0);
    }

    #[test]
    fn test_palette_expansion() {
        assert_eq!(palette_to_rgb(&ColorModel::Gray, &[10, 200]), vec![10, 10, 10, 200, 200, 200]);
        assert_eq!(palette_to_rgb(&ColorModel::Cmyk, &[0, 0, 0, 255]), vec![0, 0, 0]);
    }

    #[test]
    fn test_decode_operations_rejects_truncated_stream() {
        for data in [
            &b"BT /F1 12 Tf 72 720 Td (unterminated Tj ET"[..],
            b"q 1 0 0 1 0 0 cm [ ( ] >> << Tj",
        ] {
            assert!(matches!(
                decode_operations(data),
                Err(Error::DocumentParse { page: None, .. })
            ));
        }
    }

    #[test]
    fn test_decode_operations_skips_inline_image() {
        let ops = decode_operations(b"q BI /W 1 /H 1 /CS /G /BPC 8 ID \xffEI EI Q BT ET").unwrap();
        let names: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(names, vec!["q", "Q", "BT", "ET"]);
    }

    #[test]
    fn test_decode_operations() {
        let ops = decode_operations(b"BT /F1 12 Tf 72 700 Td (Hi) Tj ET").unwrap();
        let names: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "Td", "Tj", "ET"]);
        assert_eq!(ops[1].number(1), Some(12.0));
        assert_eq!(ops[3].operands, vec![PdfValue::Str(b"Hi".to_vec())]);
    }
}
