//! Page-level content extracted from a PDF page.

use serde::{Deserialize, Serialize};

use super::ImageAsset;

/// An axis-aligned bounding box in points (1 point = 1/72 inch).
///
/// The origin is the top-left corner of the page and `y` grows downward,
/// the same orientation a slide uses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    /// Create a bounding box from two corners.
    ///
    /// Corners are reordered so that `x1 >= x0` and `y1 >= y0`, and negative
    /// or non-finite coordinates are clamped to zero.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let (x0, x1) = (clamp(x0.min(x1)), clamp(x0.max(x1)));
        let (y0, y1) = (clamp(y0.min(y1)), clamp(y0.max(y1)));
        Self { x0, y0, x1, y1 }
    }

    /// Width in points.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height in points.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Whether the box encloses no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// A color value as reported by the content model, before validation.
///
/// Only a three-component tuple is a usable RGB color; every other shape is
/// kept as-is so the style resolver can decide how to default it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawColor {
    /// Numeric tuple in 0-255 channel space (length is not guaranteed).
    Components(Vec<f64>),
    /// A single packed number.
    Packed(i64),
    /// A color given by name or some other textual form.
    Named(String),
}

impl RawColor {
    /// Convenience constructor for an RGB triple.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        RawColor::Components(vec![r as f64, g as f64, b as f64])
    }
}

/// A run of text with its position and raw style attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// Bounding box on the page, in points
    pub bbox: BBox,
    /// The text content
    pub text: String,
    /// Font name (e.g., "Helvetica-Bold"), if known
    pub font: Option<String>,
    /// Font size in points, if known
    pub size: Option<f64>,
    /// Fill color at the time the text was shown, if known
    pub color: Option<RawColor>,
}

impl TextRun {
    /// Create a run with no style attributes.
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            bbox,
            text: text.into(),
            font: None,
            size: None,
            color: None,
        }
    }

    /// Set the font name.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Set the font size.
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the raw color.
    pub fn with_color(mut self, color: RawColor) -> Self {
        self.color = Some(color);
        self
    }
}

/// Everything extracted from a single page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Zero-based page index
    pub index: usize,

    /// Page width in points
    pub width: f64,

    /// Page height in points
    pub height: f64,

    /// Text runs in content-stream order
    pub runs: Vec<TextRun>,

    /// Embedded images in resource order
    pub images: Vec<ImageAsset>,
}

impl PageContent {
    /// Create empty content for a page of the given size.
    pub fn new(index: usize, width: f64, height: f64) -> Self {
        Self {
            index,
            width,
            height,
            runs: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Whether the page produced neither text nor images.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.images.is_empty()
    }
}
