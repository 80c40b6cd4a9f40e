//! PDF to slide deck conversion.
//!
//! [`Converter`] drives the whole pipeline: each page is extracted, its text
//! runs styled and its images classified, and the resulting slide appended
//! to the deck in page order.
//!
//! # Example
//!
//! ```no_run
//! use pdfdeck::convert::{ConvertOptions, Converter};
//! use pdfdeck::slide::ShapePlacement;
//!
//! fn main() -> pdfdeck::Result<()> {
//!     let options = ConvertOptions::new().with_placement(ShapePlacement::ContourBounds);
//!     let converter = Converter::new(options);
//!
//!     let pdf = std::fs::read("slides.pdf")?;
//!     let (deck, stats) = converter.convert_with_stats(&pdf)?;
//!     std::fs::write("slides.pptx", deck.to_pptx_bytes()?)?;
//!     println!("{} slides, {} shapes", stats.pages, stats.shape_count());
//!     Ok(())
//! }
//! ```

mod converter;

pub use converter::Converter;

use serde::{Deserialize, Serialize};

use crate::shapes::ClassifierConfig;
use crate::slide::{PresetShape, ShapePlacement, SlideSize};
use crate::style::StyleDefaults;

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Build slides on the rayon thread pool
    pub parallel: bool,

    /// Fallback font, size and color for text runs
    pub style: StyleDefaults,

    /// Binarization and polygon approximation settings
    pub classifier: ClassifierConfig,

    /// Where recovered shapes are placed
    pub placement: ShapePlacement,

    /// Slide dimensions
    pub slide_size: SlideSize,

    /// Size slides to the first page instead of `slide_size`
    pub match_page_size: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            style: StyleDefaults::default(),
            classifier: ClassifierConfig::default(),
            placement: ShapePlacement::default(),
            slide_size: SlideSize::default(),
            match_page_size: false,
        }
    }
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process pages one at a time on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Enable or disable parallel slide building.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set style defaults.
    pub fn with_style_defaults(mut self, style: StyleDefaults) -> Self {
        self.style = style;
        self
    }

    /// Set the classifier configuration.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the shape placement policy.
    pub fn with_placement(mut self, placement: ShapePlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Set a fixed slide size.
    pub fn with_slide_size(mut self, size: SlideSize) -> Self {
        self.slide_size = size;
        self.match_page_size = false;
        self
    }

    /// Use the first page's MediaBox as the slide size.
    pub fn with_page_sized_slides(mut self) -> Self {
        self.match_page_size = true;
        self
    }
}

/// Counters collected while converting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages converted (equals the slide count)
    pub pages: usize,

    /// Text boxes written
    pub text_boxes: usize,

    /// Image XObjects examined
    pub images: usize,

    /// Rectangle primitives written
    pub rectangles: usize,

    /// Triangle primitives written
    pub triangles: usize,

    /// Ellipse primitives written
    pub circles: usize,

    /// Images that could not be decoded and yielded no shapes
    pub image_decode_failures: usize,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one shape primitive.
    pub fn add_shape(&mut self, preset: PresetShape) {
        match preset {
            PresetShape::Rectangle => self.rectangles += 1,
            PresetShape::IsoscelesTriangle => self.triangles += 1,
            PresetShape::Ellipse => self.circles += 1,
        }
    }

    /// Total shape primitives.
    pub fn shape_count(&self) -> usize {
        self.rectangles + self.triangles + self.circles
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.pages += other.pages;
        self.text_boxes += other.text_boxes;
        self.images += other.images;
        self.rectangles += other.rectangles;
        self.triangles += other.triangles;
        self.circles += other.circles;
        self.image_decode_failures += other.image_decode_failures;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_parallel(false)
            .with_placement(ShapePlacement::ContourBounds)
            .with_classifier(ClassifierConfig::default().with_threshold(200))
            .with_style_defaults(StyleDefaults::default().with_font_size(10.0));

        assert!(!options.parallel);
        assert_eq!(options.placement, ShapePlacement::ContourBounds);
        assert_eq!(options.classifier.threshold, 200);
        assert_eq!(options.style.font_size, 10.0);
    }

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert!(options.parallel);
        assert_eq!(options.placement, ShapePlacement::Fixed);
        assert_eq!(options.slide_size, SlideSize::default());
        assert!(!ConvertOptions::sequential().parallel);
    }

    #[test]
    fn test_slide_size_overrides_page_sizing() {
        let options = ConvertOptions::new()
            .with_page_sized_slides()
            .with_slide_size(SlideSize::new(13.333, 7.5));
        assert!(!options.match_page_size);
    }

    #[test]
    fn test_stats_merge() {
        let mut total = ConversionStats::new();
        let mut page = ConversionStats {
            pages: 1,
            text_boxes: 3,
            images: 1,
            ..Default::default()
        };
        page.add_shape(PresetShape::Rectangle);
        page.add_shape(PresetShape::Ellipse);

        total.merge(&page);
        total.merge(&page);

        assert_eq!(total.pages, 2);
        assert_eq!(total.text_boxes, 6);
        assert_eq!(total.rectangles, 2);
        assert_eq!(total.circles, 2);
        assert_eq!(total.shape_count(), 4);
    }
}
