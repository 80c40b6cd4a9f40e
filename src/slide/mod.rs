//! Slide model and the page-to-slide builder.

mod builder;
mod model;

pub use builder::{ShapePlacement, SlideBuilder};
pub use model::{
    inches_to_emu, points_to_inches, DeckBuilder, DocumentProperties, Frame, Paragraph,
    PresetShape, ShapePrimitive, Slide, SlideDocument, SlideObject, SlideSize, TextBox,
    EMU_PER_INCH, POINTS_PER_INCH,
};
