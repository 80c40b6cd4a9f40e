//! Text style resolution.
//!
//! The page extractor reports font, size and color exactly as it finds them,
//! which may be missing or malformed. [`StyleResolver`] turns those raw
//! attributes into a [`ResolvedStyle`] that is always complete. Resolution
//! never fails: anything unusable is replaced by a configured default and a
//! debug notice is logged.

use serde::{Deserialize, Serialize};

use crate::model::{RawColor, TextRun};

/// Font used when a run reports none.
pub const DEFAULT_FONT_NAME: &str = "Arial";

/// Font size in points used when a run reports none.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Black.
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uppercase hex triplet without `#`, as OOXML `srgbClr` expects.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// A fully populated text style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStyle {
    /// Font family name, never blank
    pub font_name: String,
    /// Font size in points, finite and positive
    pub font_size: f64,
    /// Text color
    pub color: Rgb,
}

/// Values substituted for missing or invalid attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDefaults {
    pub font_name: String,
    pub font_size: f64,
    pub color: Rgb,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            font_name: DEFAULT_FONT_NAME.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: Rgb::BLACK,
        }
    }
}

impl StyleDefaults {
    /// Set the fallback font name. Blank names are ignored.
    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.font_name = name;
        }
        self
    }

    /// Set the fallback font size. Non-positive or non-finite sizes are ignored.
    pub fn with_font_size(mut self, size: f64) -> Self {
        if size.is_finite() && size > 0.0 {
            self.font_size = size;
        }
        self
    }

    /// Set the fallback color.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

/// Why a raw attribute was replaced by its default.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleNotice {
    /// No font name, or a blank one.
    MissingFont,
    /// No size, or a size that is zero, negative, or not finite.
    InvalidSize(Option<f64>),
    /// No color was reported.
    MissingColor,
    /// The color is not a three-channel tuple of whole numbers in 0-255.
    InvalidColor(RawColor),
}

impl std::fmt::Display for StyleNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StyleNotice::MissingFont => write!(f, "missing font name"),
            StyleNotice::InvalidSize(None) => write!(f, "missing font size"),
            StyleNotice::InvalidSize(Some(size)) => write!(f, "invalid font size {}", size),
            StyleNotice::MissingColor => write!(f, "missing color"),
            StyleNotice::InvalidColor(color) => write!(f, "invalid color {:?}", color),
        }
    }
}

/// Resolves raw text attributes into a complete style.
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    defaults: StyleDefaults,
}

impl StyleResolver {
    /// Create a resolver with the given defaults.
    pub fn new(defaults: StyleDefaults) -> Self {
        Self { defaults }
    }

    /// Get the configured defaults.
    pub fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    /// Resolve the style of a run.
    pub fn resolve(&self, run: &TextRun) -> ResolvedStyle {
        self.resolve_with_notices(run).0
    }

    /// Resolve the style of a run and report every default that was applied.
    pub fn resolve_with_notices(&self, run: &TextRun) -> (ResolvedStyle, Vec<StyleNotice>) {
        let mut notices = Vec::new();

        let font_name = match run.font.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                notices.push(StyleNotice::MissingFont);
                self.defaults.font_name.clone()
            }
        };

        let font_size = match run.size {
            Some(size) if size.is_finite() && size > 0.0 => size,
            other => {
                notices.push(StyleNotice::InvalidSize(other));
                self.defaults.font_size
            }
        };

        let color = match &run.color {
            None => {
                notices.push(StyleNotice::MissingColor);
                self.defaults.color
            }
            Some(raw) => match rgb_from_raw(raw) {
                Some(rgb) => rgb,
                None => {
                    notices.push(StyleNotice::InvalidColor(raw.clone()));
                    self.defaults.color
                }
            },
        };

        for notice in &notices {
            log::debug!("Style default applied to {:?}: {}", run.text, notice);
        }

        (
            ResolvedStyle {
                font_name,
                font_size,
                color,
            },
            notices,
        )
    }
}

/// Accept only a three-channel tuple of whole numbers in 0..=255.
fn rgb_from_raw(raw: &RawColor) -> Option<Rgb> {
    let RawColor::Components(components) = raw else {
        return None;
    };
    let [r, g, b] = components.as_slice() else {
        return None;
    };
    Some(Rgb::new(channel(*r)?, channel(*g)?, channel(*b)?))
}

fn channel(value: f64) -> Option<u8> {
    if value.is_finite() && value.fract() == 0.0 && (0.0..=255.0).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}
