//! Page-to-slide mapping.

use serde::{Deserialize, Serialize};

use crate::model::{BBox, ImageAsset, PageContent, TextRun};
use crate::shapes::{DetectedShape, ShapeKind};
use crate::style::ResolvedStyle;

use super::model::{Frame, Paragraph, PresetShape, ShapePrimitive, Slide, SlideObject, TextBox};

/// Where recovered shapes are placed on the slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapePlacement {
    /// Fixed frame per shape kind, independent of the source image
    #[default]
    Fixed,
    /// Contour bounding box mapped through the image's on-page placement
    ContourBounds,
}

impl ShapePlacement {
    /// The fixed frame used for a shape kind.
    ///
    /// Rectangles are 2 × 1 in, triangles and circles 2 × 2 in, all anchored
    /// at (1 in, 1 in).
    pub fn fixed_frame(kind: ShapeKind) -> Frame {
        match kind {
            ShapeKind::Rectangle => Frame::new(1.0, 1.0, 2.0, 1.0),
            ShapeKind::Triangle | ShapeKind::Circle => Frame::new(1.0, 1.0, 2.0, 2.0),
        }
    }

    fn frame_for(&self, shape: &DetectedShape, image: &ImageAsset) -> Frame {
        match self {
            ShapePlacement::Fixed => Self::fixed_frame(shape.kind),
            ShapePlacement::ContourBounds => image
                .placement
                .and_then(|placement| contour_frame(shape, &placement))
                .unwrap_or_else(|| Self::fixed_frame(shape.kind)),
        }
    }
}

/// Map a contour's pixel bounds into the page box the image was painted in.
///
/// Image row 0 is the top edge of the placement.
fn contour_frame(shape: &DetectedShape, placement: &BBox) -> Option<Frame> {
    let (min_x, min_y, max_x, max_y) = shape.bounds()?;
    if shape.image_width == 0 || shape.image_height == 0 {
        return None;
    }
    let sx = placement.width() / shape.image_width as f64;
    let sy = placement.height() / shape.image_height as f64;

    let x0 = placement.x0 + min_x as f64 * sx;
    let y0 = placement.y0 + min_y as f64 * sy;
    let x1 = placement.x0 + (max_x + 1) as f64 * sx;
    let y1 = placement.y0 + (max_y + 1) as f64 * sy;

    Some(Frame::from_bbox(&BBox::new(x0, y0, x1, y1)))
}

/// Builds one slide from one page.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlideBuilder {
    placement: ShapePlacement,
}

impl SlideBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placement(mut self, placement: ShapePlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn placement(&self) -> ShapePlacement {
        self.placement
    }

    /// Consume a page and produce its slide.
    ///
    /// Every text run becomes its own text box, in run order. Shapes follow,
    /// image by image. `shapes_of` is expected to have already swallowed
    /// decode failures.
    pub fn build<S, D>(&self, page: PageContent, style_of: S, mut shapes_of: D) -> Slide
    where
        S: Fn(&TextRun) -> ResolvedStyle,
        D: FnMut(&ImageAsset) -> Vec<DetectedShape>,
    {
        let mut slide = Slide::new();

        for run in &page.runs {
            slide.push(SlideObject::TextBox(self.text_box(run, style_of(run))));
        }

        for image in &page.images {
            for shape in shapes_of(image) {
                slide.push(SlideObject::Shape(ShapePrimitive {
                    preset: PresetShape::from(shape.kind),
                    frame: self.placement.frame_for(&shape, image),
                }));
            }
        }

        log::debug!("Page {}: built slide with {} object(s)", page.index, slide.len());
        slide
    }

    fn text_box(&self, run: &TextRun, style: ResolvedStyle) -> TextBox {
        TextBox {
            frame: Frame::from_bbox(&run.bbox),
            paragraphs: vec![Paragraph::new(run.text.clone(), style)],
        }
    }
}
