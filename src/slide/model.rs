//! Slide-side model: what the presentation writer serializes.
//!
//! All geometry here is in inches with a top-left origin. Conversion to
//! EMUs happens only when XML is written.

use std::io::{Seek, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BBox, Metadata};
use crate::shapes::ShapeKind;
use crate::style::{ResolvedStyle, Rgb};

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// PDF user-space units (points) per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Convert points to inches.
pub fn points_to_inches(points: f64) -> f64 {
    points / POINTS_PER_INCH
}

/// Convert inches to EMUs, rounding to the nearest unit.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Position and size of a slide object, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Map a page box in points to inches.
    pub fn from_bbox(bbox: &BBox) -> Self {
        Self {
            left: points_to_inches(bbox.x0),
            top: points_to_inches(bbox.y0),
            width: points_to_inches(bbox.width()),
            height: points_to_inches(bbox.height()),
        }
    }

    /// `(x, y, cx, cy)` in EMUs. Negative extents are written as zero.
    pub fn to_emu(&self) -> (i64, i64, i64, i64) {
        (
            inches_to_emu(self.left),
            inches_to_emu(self.top),
            inches_to_emu(self.width).max(0),
            inches_to_emu(self.height).max(0),
        )
    }
}

/// A single styled, left-aligned paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    pub color: Rgb,
}

impl Paragraph {
    /// Create a paragraph with the given style.
    pub fn new(text: impl Into<String>, style: ResolvedStyle) -> Self {
        Self {
            text: text.into(),
            font_name: style.font_name,
            font_size: style.font_size,
            color: style.color,
        }
    }
}

/// A positioned text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub frame: Frame,
    pub paragraphs: Vec<Paragraph>,
}

impl TextBox {
    /// The text of all paragraphs, newline separated.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Preset geometry of a native shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetShape {
    Rectangle,
    IsoscelesTriangle,
    Ellipse,
}

impl PresetShape {
    /// DrawingML `prst` value.
    pub fn prst(&self) -> &'static str {
        match self {
            PresetShape::Rectangle => "rect",
            PresetShape::IsoscelesTriangle => "triangle",
            PresetShape::Ellipse => "ellipse",
        }
    }

    /// Display name used for the shape's `cNvPr`.
    pub fn display_name(&self) -> &'static str {
        match self {
            PresetShape::Rectangle => "Rectangle",
            PresetShape::IsoscelesTriangle => "Isosceles Triangle",
            PresetShape::Ellipse => "Oval",
        }
    }
}

impl From<ShapeKind> for PresetShape {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rectangle => PresetShape::Rectangle,
            ShapeKind::Triangle => PresetShape::IsoscelesTriangle,
            ShapeKind::Circle => PresetShape::Ellipse,
        }
    }
}

/// A native, editable shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapePrimitive {
    pub preset: PresetShape,
    pub frame: Frame,
}

/// Anything that can be placed on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SlideObject {
    TextBox(TextBox),
    Shape(ShapePrimitive),
}

impl SlideObject {
    pub fn frame(&self) -> &Frame {
        match self {
            SlideObject::TextBox(tb) => &tb.frame,
            SlideObject::Shape(shape) => &shape.frame,
        }
    }
}

/// One slide: objects in painting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub objects: Vec<SlideObject>,
}

impl Slide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: SlideObject) {
        self.objects.push(object);
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBox> {
        self.objects.iter().filter_map(|o| match o {
            SlideObject::TextBox(tb) => Some(tb),
            SlideObject::Shape(_) => None,
        })
    }

    pub fn shapes(&self) -> impl Iterator<Item = &ShapePrimitive> {
        self.objects.iter().filter_map(|o| match o {
            SlideObject::Shape(shape) => Some(shape),
            SlideObject::TextBox(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Slide dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideSize {
    pub width: f64,
    pub height: f64,
}

impl Default for SlideSize {
    /// 10 × 7.5 inches (4:3).
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 7.5,
        }
    }
}

impl SlideSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A slide the size of a PDF page given in points.
    pub fn from_points(width: f64, height: f64) -> Self {
        Self::new(points_to_inches(width), points_to_inches(height))
    }

    /// `(cx, cy)` in EMUs.
    pub fn to_emu(&self) -> (i64, i64) {
        (inches_to_emu(self.width), inches_to_emu(self.height))
    }
}

/// Document properties written to `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentProperties {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl From<&Metadata> for DocumentProperties {
    fn from(meta: &Metadata) -> Self {
        Self {
            title: meta.title.clone(),
            author: meta.author.clone(),
            subject: meta.subject.clone(),
            keywords: meta.keywords.clone(),
            created: meta.created,
            modified: meta.modified,
        }
    }
}

/// Accumulates slides while a document is being converted.
#[derive(Debug, Default)]
pub struct DeckBuilder {
    slides: Vec<Slide>,
    size: SlideSize,
    properties: DocumentProperties,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: SlideSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_properties(mut self, properties: DocumentProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Append the next slide.
    pub fn push(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Freeze the deck.
    pub fn finish(self) -> SlideDocument {
        SlideDocument {
            slides: self.slides,
            size: self.size,
            properties: self.properties,
        }
    }
}

/// A finished, immutable slide deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDocument {
    slides: Vec<Slide>,
    size: SlideSize,
    properties: DocumentProperties,
}

impl SlideDocument {
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn size(&self) -> SlideSize {
        self.size
    }

    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    /// Serialize as a `.pptx` package.
    pub fn to_pptx_bytes(&self) -> Result<Vec<u8>> {
        crate::pptx::to_bytes(self)
    }

    /// Serialize as a `.pptx` package into a seekable writer.
    pub fn write_pptx<W: Write + Seek>(&self, writer: W) -> Result<W> {
        crate::pptx::write_package(self, writer)
    }
}
