//! Shape recovery from embedded raster images.
//!
//! An image is decoded in memory to grayscale, binarized with a fixed global
//! threshold, and traced for contours (with full border hierarchy). Each
//! contour is simplified to a polygon and labeled by its vertex count:
//!
//! | vertices | kind |
//! |---|---|
//! | 3 | [`ShapeKind::Triangle`] |
//! | 4 | [`ShapeKind::Rectangle`] |
//! | anything else | [`ShapeKind::Circle`] |
//!
//! "Circle" is a catch-all, not a circularity test.

mod decode;
mod polygon;

use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::geometry::arc_length;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ImageAsset;

pub use decode::{decode_encoded_luma, decode_luma};
pub use polygon::approximate_closed;

/// Default binarization threshold.
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Default polygon tolerance as a fraction of the contour perimeter.
pub const DEFAULT_EPSILON_RATIO: f64 = 0.02;

/// Label assigned to a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Triangle,
    Rectangle,
    Circle,
}

impl ShapeKind {
    /// Classify a polygon by its vertex count.
    pub fn from_vertex_count(count: usize) -> Self {
        match count {
            3 => ShapeKind::Triangle,
            4 => ShapeKind::Rectangle,
            _ => ShapeKind::Circle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Triangle => "triangle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shape found in an image, with the contour it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedShape {
    pub kind: ShapeKind,
    /// Contour points in image pixel coordinates
    pub contour: Vec<Point<i32>>,
    /// Width of the source image in pixels
    pub image_width: u32,
    /// Height of the source image in pixels
    pub image_height: u32,
}

impl DetectedShape {
    /// Pixel bounding box of the contour as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.contour.first()?;
        Some(self.contour.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        ))
    }
}

/// Classifier settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Pixels brighter than this become foreground
    pub threshold: u8,
    /// Douglas-Peucker tolerance relative to contour perimeter
    pub epsilon_ratio: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            epsilon_ratio: DEFAULT_EPSILON_RATIO,
        }
    }
}

impl ClassifierConfig {
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the tolerance ratio. Negative or non-finite values are ignored.
    pub fn with_epsilon_ratio(mut self, ratio: f64) -> Self {
        if ratio.is_finite() && ratio >= 0.0 {
            self.epsilon_ratio = ratio;
        }
        self
    }
}

/// Finds and labels shapes in raster images.
#[derive(Debug, Clone, Default)]
pub struct ShapeClassifier {
    config: ClassifierConfig,
}

impl ShapeClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify the shapes in an extracted PDF image.
    ///
    /// Fails with [`Error::ImageDecode`](crate::Error::ImageDecode) when the
    /// image cannot be decoded.
    pub fn classify(&self, asset: &ImageAsset) -> Result<Vec<DetectedShape>> {
        let luma = decode_luma(asset)?;
        Ok(self.classify_luma(&luma))
    }

    /// Classify the shapes in an encoded image (PNG, JPEG).
    pub fn classify_encoded(&self, data: &[u8]) -> Result<Vec<DetectedShape>> {
        let luma = decode_encoded_luma(data)?;
        Ok(self.classify_luma(&luma))
    }

    /// Classify the shapes in an already decoded grayscale image.
    pub fn classify_luma(&self, luma: &GrayImage) -> Vec<DetectedShape> {
        let (width, height) = luma.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let binary = threshold(luma, self.config.threshold, ThresholdType::Binary);
        let contours = find_contours::<i32>(&binary);

        let shapes: Vec<DetectedShape> = contours
            .into_iter()
            .map(|contour| {
                let epsilon = self.config.epsilon_ratio * arc_length(&contour.points, true);
                let vertices = approximate_closed(&contour.points, epsilon).len();
                DetectedShape {
                    kind: ShapeKind::from_vertex_count(vertices),
                    contour: contour.points,
                    image_width: width,
                    image_height: height,
                }
            })
            .collect();

        log::debug!(
            "Classified {} contour(s) in {}x{} image",
            shapes.len(),
            width,
            height
        );
        shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image::{DynamicImage, ImageFormat, Luma};
    use std::io::Cursor;

    fn blank(size: u32) -> GrayImage {
        GrayImage::from_pixel(size, size, Luma([0]))
    }

    fn fill(img: &mut GrayImage, inside: impl Fn(i32, i32) -> bool) {
        for (x, y, px) in img.enumerate_pixels_mut() {
            if inside(x as i32, y as i32) {
                *px = Luma([255]);
            }
        }
    }

    fn png_bytes(img: GrayImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_vertex_count_mapping() {
        assert_eq!(ShapeKind::from_vertex_count(3), ShapeKind::Triangle);
        assert_eq!(ShapeKind::from_vertex_count(4), ShapeKind::Rectangle);
        for n in [0, 1, 2, 5, 8, 40] {
            assert_eq!(ShapeKind::from_vertex_count(n), ShapeKind::Circle);
        }
    }

    #[test]
    fn test_rectangle_image() {
        let mut img = blank(100);
        fill(&mut img, |x, y| (20..=80).contains(&x) && (30..=60).contains(&y));

        let shapes = ShapeClassifier::default().classify_luma(&img);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].kind, ShapeKind::Rectangle);
        assert_eq!(shapes[0].bounds(), Some((20, 30, 80, 60)));
    }

    #[test]
    fn test_triangle_image() {
        let mut img = blank(100);
        // Right triangle with corners (10,10), (10,70), (70,70)
        fill(&mut img, |x, y| x >= 10 && y <= 70 && y - x >= 0 && y >= 10);

        let shapes = ShapeClassifier::default().classify_luma(&img);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].kind, ShapeKind::Triangle);
    }

    #[test]
    fn test_disc_image_is_circle() {
        let mut img = blank(100);
        fill(&mut img, |x, y| (x - 50).pow(2) + (y - 50).pow(2) <= 30 * 30);

        let shapes = ShapeClassifier::default().classify_luma(&img);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].kind, ShapeKind::Circle);
    }

    #[test]
    fn test_empty_image_has_no_shapes() {
        let shapes = ShapeClassifier::default().classify_luma(&blank(32));
        assert!(shapes.is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        // 127 is not above the default threshold
        let img = GrayImage::from_pixel(16, 16, Luma([127]));
        assert!(ShapeClassifier::default().classify_luma(&img).is_empty());

        let lowered = ShapeClassifier::new(ClassifierConfig::default().with_threshold(100));
        assert_eq!(lowered.classify_luma(&img).len(), 1);
    }

    #[test]
    fn test_classify_encoded_png() {
        let mut img = blank(64);
        fill(&mut img, |x, y| (8..=56).contains(&x) && (16..=40).contains(&y));

        let shapes = ShapeClassifier::default()
            .classify_encoded(&png_bytes(img))
            .unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].kind, ShapeKind::Rectangle);
        assert_eq!(shapes[0].image_width, 64);
    }

    #[test]
    fn test_nested_contours_are_all_reported() {
        let mut img = blank(100);
        // Square ring: outer border and inner hole
        fill(&mut img, |x, y| {
            let outer = (10..=90).contains(&x) && (10..=90).contains(&y);
            let hole = (30..=70).contains(&x) && (30..=70).contains(&y);
            outer && !hole
        });

        let shapes = ShapeClassifier::default().classify_luma(&img);
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].kind, ShapeKind::Rectangle);
        assert_eq!(shapes[0].bounds(), Some((10, 10, 90, 90)));
    }

    #[test]
    fn test_corrupt_bytes_fail_with_decode_error() {
        let result = ShapeClassifier::default().classify_encoded(b"definitely not an image");
        assert!(matches!(result, Err(Error::ImageDecode(_))));
    }
}
