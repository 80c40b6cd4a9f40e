//! Content stream interpretation.
//!
//! Walks a page's operators with a graphics-state stack and produces a
//! block → line → run layout in source order. Each `BT`..`ET` text object is
//! a text block, a new line starts whenever the baseline moves, and each
//! text-showing operator yields one run. Painting an image XObject yields an
//! image block. Form XObjects are interpreted in place.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::{BBox, RawColor, TextRun};

use super::backend::{ContentOp, FontMetrics, ObjectRef, PdfBackend, PdfValue, Scope, XObjectKind};

/// Ascent of a run above its baseline, in em.
pub const ASCENT: f64 = 0.8;

/// Descent of a run below its baseline, in em.
pub const DESCENT: f64 = 0.2;

/// TJ adjustments beyond this (in 1/1000 em) read as a word gap.
const TJ_SPACE_THRESHOLD: f64 = 200.0;

/// Nesting limit for Form XObjects.
const MAX_FORM_DEPTH: usize = 12;

/// A 2D affine transform `[a b c d e f]`, as PDF writes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn from_array(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Length of the transformed unit y vector.
    pub fn vertical_scale(&self) -> f64 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// A text run in device space, before page-relative conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RunGeometry {
    pub text: String,
    pub font: Option<String>,
    pub size: f64,
    pub color: RawColor,
    /// `[x0, y0, x1, y1]` in PDF user space (bottom-left origin)
    pub rect: [f64; 4],
    pub baseline: f64,
}

/// Runs sharing a baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLine {
    pub runs: Vec<RunGeometry>,
}

/// One `BT`..`ET` text object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

/// A painted image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub id: ObjectRef,
    /// `[x0, y0, x1, y1]` in PDF user space
    pub rect: [f64; 4],
}

/// A top-level layout element.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(TextBlock),
    Image(ImageBlock),
}

/// Interpreted page layout in painting order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub blocks: Vec<ContentBlock>,
}

impl PageLayout {
    /// Flatten text blocks into page-relative runs.
    ///
    /// `media_box` is `[llx, lly, urx, ury]`; output boxes use a top-left
    /// origin with y growing downward.
    pub fn text_runs(&self, media_box: [f64; 4]) -> Vec<TextRun> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text),
                ContentBlock::Image(_) => None,
            })
            .flat_map(|block| block.lines.iter())
            .flat_map(|line| line.runs.iter())
            .map(|run| {
                let mut text_run = TextRun::new(run.text.clone(), to_page_box(run.rect, media_box))
                    .with_size(run.size)
                    .with_color(run.color.clone());
                text_run.font = run.font.clone();
                text_run
            })
            .collect()
    }

    /// Page-relative box of the first paint of each image.
    pub fn image_placements(&self, media_box: [f64; 4]) -> HashMap<ObjectRef, BBox> {
        let mut placements = HashMap::new();
        for block in &self.blocks {
            if let ContentBlock::Image(image) = block {
                placements
                    .entry(image.id)
                    .or_insert_with(|| to_page_box(image.rect, media_box));
            }
        }
        placements
    }
}

/// Convert a user-space rectangle to top-left page coordinates.
pub fn to_page_box(rect: [f64; 4], media_box: [f64; 4]) -> BBox {
    let [llx, _, _, ury] = media_box;
    BBox::new(rect[0] - llx, ury - rect[3], rect[2] - llx, ury - rect[1])
}

#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill: RawColor,
    text: TextState,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            // DeviceGray black
            fill: RawColor::Components(vec![0.0]),
            text: TextState::default(),
        }
    }
}

/// Interprets content streams against a backend.
pub struct ContentInterpreter<'a, B: PdfBackend> {
    backend: &'a B,
    fonts: HashMap<Scope, HashMap<Vec<u8>, FontMetrics>>,
    layout: PageLayout,
}

impl<'a, B: PdfBackend> ContentInterpreter<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            fonts: HashMap::new(),
            layout: PageLayout::default(),
        }
    }

    /// Interpret a page's content stream.
    pub fn run_page(mut self, scope: Scope) -> Result<PageLayout> {
        let data = self.backend.content(scope)?;
        let ops = self.backend.decode_content(&data)?;
        self.interpret(scope, &ops, GraphicsState::default(), 0)?;
        Ok(self.layout)
    }

    /// Interpret already decoded operations in a scope.
    pub fn run_ops(mut self, scope: Scope, ops: &[ContentOp]) -> Result<PageLayout> {
        self.interpret(scope, ops, GraphicsState::default(), 0)?;
        Ok(self.layout)
    }

    fn fonts_for(&mut self, scope: Scope) -> Result<&HashMap<Vec<u8>, FontMetrics>> {
        if !self.fonts.contains_key(&scope) {
            let fonts = self.backend.fonts(scope)?;
            self.fonts.insert(scope, fonts);
        }
        Ok(&self.fonts[&scope])
    }

    fn interpret(
        &mut self,
        scope: Scope,
        ops: &[ContentOp],
        initial: GraphicsState,
        depth: usize,
    ) -> Result<()> {
        let mut gs = initial;
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut tm = Matrix::IDENTITY;
        let mut tlm = Matrix::IDENTITY;
        let mut block: Option<TextBlock> = None;
        let mut xobjects = None;

        for op in ops {
            match op.operator.as_str() {
                "q" => stack.push(gs.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        gs = saved;
                    }
                }
                "cm" => {
                    if let [a, b, c, d, e, f] = op.numbers()[..] {
                        gs.ctm = Matrix::new(a, b, c, d, e, f).then(&gs.ctm);
                    }
                }

                // Color
                "rg" => gs.fill = components(op, 3),
                "g" => gs.fill = components(op, 1),
                "k" => gs.fill = components(op, 4),
                "sc" | "scn" => {
                    gs.fill = match op.operands.last() {
                        Some(PdfValue::Name(pattern)) => {
                            RawColor::Named(String::from_utf8_lossy(pattern).to_string())
                        }
                        _ => components(op, op.operands.len()),
                    }
                }
                "cs" => {
                    gs.fill = match op.operands.first() {
                        Some(PdfValue::Name(name)) => initial_color(name),
                        _ => gs.fill.clone(),
                    }
                }
                // Stroke colors do not affect text fill.
                "RG" | "G" | "K" | "CS" | "SC" | "SCN" => {}

                // Text objects
                "BT" => {
                    tm = Matrix::IDENTITY;
                    tlm = Matrix::IDENTITY;
                    block = Some(TextBlock::default());
                }
                "ET" => {
                    if let Some(done) = block.take() {
                        if !done.lines.is_empty() {
                            self.layout.blocks.push(ContentBlock::Text(done));
                        }
                    }
                }

                // Text state
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        gs.text.font_key = name.clone();
                    }
                    if let Some(size) = op.number(1) {
                        gs.text.font_size = size;
                    }
                }
                "Tc" => gs.text.char_spacing = op.number(0).unwrap_or(0.0),
                "Tw" => gs.text.word_spacing = op.number(0).unwrap_or(0.0),
                "Tz" => gs.text.horizontal_scale = op.number(0).unwrap_or(100.0) / 100.0,
                "TL" => gs.text.leading = op.number(0).unwrap_or(0.0),
                "Ts" => gs.text.rise = op.number(0).unwrap_or(0.0),

                // Text positioning
                "Td" | "TD" => {
                    let tx = op.number(0).unwrap_or(0.0);
                    let ty = op.number(1).unwrap_or(0.0);
                    if op.operator == "TD" {
                        gs.text.leading = -ty;
                    }
                    tlm = Matrix::translation(tx, ty).then(&tlm);
                    tm = tlm;
                }
                "Tm" => {
                    if let [a, b, c, d, e, f] = op.numbers()[..] {
                        tlm = Matrix::new(a, b, c, d, e, f);
                        tm = tlm;
                    }
                }
                "T*" => {
                    tlm = Matrix::translation(0.0, -gs.text.leading).then(&tlm);
                    tm = tlm;
                }

                // Text showing
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "\"" {
                        gs.text.word_spacing = op.number(0).unwrap_or(gs.text.word_spacing);
                        gs.text.char_spacing = op.number(1).unwrap_or(gs.text.char_spacing);
                    }
                    if op.operator == "'" || op.operator == "\"" {
                        tlm = Matrix::translation(0.0, -gs.text.leading).then(&tlm);
                        tm = tlm;
                    }

                    let Some(current) = block.as_mut() else {
                        continue;
                    };
                    let fonts = self.fonts_for(scope)?;
                    let metrics = fonts.get(&gs.text.font_key).cloned().unwrap_or_default();
                    let pieces = show_operands(op);
                    if let Some(run) =
                        self.show_text(scope, &metrics, &gs, &mut tm, &pieces)
                    {
                        push_run(current, run);
                    }
                }

                // XObjects
                "Do" => {
                    let Some(PdfValue::Name(name)) = op.operands.first() else {
                        continue;
                    };
                    if xobjects.is_none() {
                        xobjects = Some(self.backend.xobjects(scope)?);
                    }
                    let Some(entry) = xobjects
                        .as_ref()
                        .and_then(|list| list.iter().find(|x| &x.name == name))
                        .cloned()
                    else {
                        log::debug!("XObject {} not found", String::from_utf8_lossy(name));
                        continue;
                    };

                    match entry.kind {
                        XObjectKind::Image => {
                            let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
                                .map(|(x, y)| gs.ctm.apply(x, y));
                            self.layout.blocks.push(ContentBlock::Image(ImageBlock {
                                id: entry.id,
                                rect: bounds_of(&corners),
                            }));
                        }
                        XObjectKind::Form(matrix) if depth < MAX_FORM_DEPTH => {
                            let form = Scope::Form(entry.id);
                            let data = self.backend.content(form)?;
                            let form_ops = self.backend.decode_content(&data)?;
                            let mut inner = gs.clone();
                            inner.ctm = Matrix::from_array(matrix).then(&gs.ctm);
                            self.interpret(form, &form_ops, inner, depth + 1)?;
                        }
                        XObjectKind::Form(_) => {
                            log::warn!("Form XObject nesting exceeds {} levels", MAX_FORM_DEPTH);
                        }
                        XObjectKind::Other => {}
                    }
                }

                _ => {}
            }
        }

        // Unterminated text object
        if let Some(done) = block.take() {
            if !done.lines.is_empty() {
                self.layout.blocks.push(ContentBlock::Text(done));
            }
        }

        Ok(())
    }

    /// Show strings and adjustments, advancing the text matrix.
    fn show_text(
        &self,
        scope: Scope,
        metrics: &FontMetrics,
        gs: &GraphicsState,
        tm: &mut Matrix,
        pieces: &[ShowPiece<'_>],
    ) -> Option<RunGeometry> {
        let ts = &gs.text;
        let start = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, ts.rise).then(tm).then(&gs.ctm);
        let mut text = String::new();

        for piece in pieces {
            match piece {
                ShowPiece::Str(bytes) => {
                    text.push_str(&self.backend.decode_text(scope, &ts.font_key, bytes));
                    let mut advance = 0.0;
                    for code in metrics.codes(bytes) {
                        let w = metrics.glyph_width(code) / 1000.0;
                        let word = if !metrics.composite && code == 32 {
                            ts.word_spacing
                        } else {
                            0.0
                        };
                        advance += (w * ts.font_size + ts.char_spacing + word) * ts.horizontal_scale;
                    }
                    *tm = Matrix::translation(advance, 0.0).then(tm);
                }
                ShowPiece::Adjust(amount) => {
                    let advance = -amount / 1000.0 * ts.font_size * ts.horizontal_scale;
                    *tm = Matrix::translation(advance, 0.0).then(tm);
                    if -amount > TJ_SPACE_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(' ')
                        && !text.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        text.push(' ');
                    }
                }
            }
        }

        if text.trim().is_empty() {
            return None;
        }

        let end = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, ts.rise).then(tm).then(&gs.ctm);
        let size = ts.font_size * start.vertical_scale();
        let (x0, baseline) = start.apply(0.0, 0.0);
        let (x1, _) = end.apply(0.0, 0.0);

        Some(RunGeometry {
            text,
            font: metrics.base_font.clone(),
            size,
            color: gs.fill.clone(),
            rect: [
                x0.min(x1),
                baseline - DESCENT * size,
                x0.max(x1),
                baseline + ASCENT * size,
            ],
            baseline,
        })
    }
}

enum ShowPiece<'o> {
    Str(&'o [u8]),
    Adjust(f64),
}

fn show_operands(op: &ContentOp) -> Vec<ShowPiece<'_>> {
    let text_index = if op.operator == "\"" { 2 } else { 0 };
    match op.operands.get(text_index) {
        Some(PdfValue::Str(bytes)) => vec![ShowPiece::Str(bytes)],
        Some(PdfValue::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                PdfValue::Str(bytes) => Some(ShowPiece::Str(bytes)),
                PdfValue::Integer(n) => Some(ShowPiece::Adjust(*n as f64)),
                PdfValue::Real(n) => Some(ShowPiece::Adjust(*n)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Append a run, opening a new line when the baseline moves.
fn push_run(block: &mut TextBlock, run: RunGeometry) {
    let same_line = block
        .lines
        .last()
        .and_then(|line| line.runs.last())
        .is_some_and(|last| (last.baseline - run.baseline).abs() < 0.01);
    if same_line {
        if let Some(line) = block.lines.last_mut() {
            line.runs.push(run);
            return;
        }
    }
    block.lines.push(TextLine { runs: vec![run] });
}

/// Fill color operands scaled to 0-255 channel space.
fn components(op: &ContentOp, expected: usize) -> RawColor {
    let values: Vec<f64> = op
        .numbers()
        .into_iter()
        .take(expected)
        .map(|v| (v * 255.0).round())
        .collect();
    RawColor::Components(values)
}

/// Initial fill color of a newly selected color space.
fn initial_color(space: &[u8]) -> RawColor {
    match space {
        b"DeviceRGB" | b"CalRGB" => RawColor::Components(vec![0.0, 0.0, 0.0]),
        b"DeviceCMYK" => RawColor::Components(vec![0.0, 0.0, 0.0, 255.0]),
        b"Pattern" => RawColor::Named("Pattern".to_string()),
        _ => RawColor::Components(vec![0.0]),
    }
}

fn bounds_of(points: &[(f64, f64)]) -> [f64; 4] {
    points.iter().fold(
        [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
        |[x0, y0, x1, y1], &(x, y)| [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
    )
}

/// Check if character is from a script that doesn't use word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::ImageAsset;
    use crate::parser::backend::{decode_operations, decode_text_simple, XObjectEntry};
    use std::collections::BTreeMap;

    /// In-memory backend: one page, fixed fonts and XObjects.
    #[derive(Default)]
    struct StubBackend {
        content: Vec<u8>,
        fonts: HashMap<Vec<u8>, FontMetrics>,
        xobjects: Vec<XObjectEntry>,
        forms: HashMap<ObjectRef, Vec<u8>>,
    }

    impl PdfBackend for StubBackend {
        fn pages(&self) -> BTreeMap<u32, ObjectRef> {
            BTreeMap::from([(1, (1, 0))])
        }
        fn media_box(&self, _page: ObjectRef) -> Result<[f64; 4]> {
            Ok([0.0, 0.0, 612.0, 792.0])
        }
        fn fonts(&self, _scope: Scope) -> Result<HashMap<Vec<u8>, FontMetrics>> {
            Ok(self.fonts.clone())
        }
        fn content(&self, scope: Scope) -> Result<Vec<u8>> {
            match scope {
                Scope::Page(_) => Ok(self.content.clone()),
                Scope::Form(id) => self
                    .forms
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| Error::parse("no such form")),
            }
        }
        fn decode_text(&self, _scope: Scope, _font: &[u8], bytes: &[u8]) -> String {
            decode_text_simple(bytes)
        }
        fn xobjects(&self, scope: Scope) -> Result<Vec<XObjectEntry>> {
            Ok(match scope {
                Scope::Page(_) => self.xobjects.clone(),
                Scope::Form(_) => Vec::new(),
            })
        }
        fn image(&self, _id: ObjectRef) -> Result<ImageAsset> {
            Err(Error::parse("not used"))
        }
    }

    fn stub(content: &str) -> StubBackend {
        let mut fonts = HashMap::new();
        fonts.insert(
            b"F1".to_vec(),
            FontMetrics {
                base_font: Some("Helvetica".to_string()),
                first_char: 32,
                widths: vec![800.0; 95],
                ..Default::default()
            },
        );
        StubBackend {
            content: content.as_bytes().to_vec(),
            fonts,
            ..Default::default()
        }
    }

    fn layout(backend: &StubBackend) -> PageLayout {
        ContentInterpreter::new(backend)
            .run_page(Scope::Page((1, 0)))
            .unwrap()
    }

    const LETTER: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

    #[test]
    fn test_single_run_geometry() {
        let backend = stub("BT /F1 10 Tf 72 700 Td (Hello) Tj ET");
        let runs = layout(&backend).text_runs(LETTER);

        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.text, "Hello");
        assert_eq!(run.font.as_deref(), Some("Helvetica"));
        assert_eq!(run.size, Some(10.0));
        // 5 glyphs * 0.8 em * 10pt
        assert!((run.bbox.x0 - 72.0).abs() < 1e-9);
        assert!((run.bbox.x1 - 112.0).abs() < 1e-9);
        // baseline 700 → top 792 - 708, bottom 792 - 698
        assert!((run.bbox.y0 - 84.0).abs() < 1e-9);
        assert!((run.bbox.y1 - 94.0).abs() < 1e-9);
    }

    #[test]
    fn test_block_line_run_hierarchy() {
        let backend = stub(
            "BT /F1 12 Tf 72 700 Td (One) Tj (Two) Tj 0 -14 Td (Three) Tj ET \
             BT /F1 12 Tf 72 500 Td (Four) Tj ET",
        );
        let page = layout(&backend);

        assert_eq!(page.blocks.len(), 2);
        let ContentBlock::Text(first) = &page.blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(first.lines.len(), 2);
        assert_eq!(first.lines[0].runs.len(), 2);
        assert_eq!(first.lines[1].runs[0].text, "Three");

        let texts: Vec<String> = page.text_runs(LETTER).into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["One", "Two", "Three", "Four"]);
    }

    #[test]
    fn test_runs_advance_along_line() {
        let backend = stub("BT /F1 10 Tf 100 700 Td (ab) Tj (cd) Tj ET");
        let runs = layout(&backend).text_runs(LETTER);
        assert!((runs[1].bbox.x0 - 116.0).abs() < 1e-9);
    }

    #[test]
    fn test_fill_colors() {
        let backend = stub(
            "BT /F1 12 Tf 1 0 0 rg 72 700 Td (red) Tj \
             0.5 g 0 -20 Td (gray) Tj \
             0 0 0 1 k 0 -20 Td (cmyk) Tj ET",
        );
        let runs = layout(&backend).text_runs(LETTER);
        assert_eq!(runs[0].color, Some(RawColor::Components(vec![255.0, 0.0, 0.0])));
        assert_eq!(runs[1].color, Some(RawColor::Components(vec![128.0])));
        assert_eq!(
            runs[2].color,
            Some(RawColor::Components(vec![0.0, 0.0, 0.0, 255.0]))
        );
    }

    #[test]
    fn test_save_restore_color() {
        let backend = stub("q 0 0 1 rg Q BT /F1 12 Tf 72 700 Td (x) Tj ET");
        let runs = layout(&backend).text_runs(LETTER);
        assert_eq!(runs[0].color, Some(RawColor::Components(vec![0.0])));
    }

    #[test]
    fn test_ctm_scales_size_and_position() {
        let backend = stub("q 2 0 0 2 0 0 cm BT /F1 10 Tf 36 300 Td (Hi) Tj ET Q");
        let runs = layout(&backend).text_runs(LETTER);
        assert_eq!(runs[0].size, Some(20.0));
        assert!((runs[0].bbox.x0 - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_tm_and_leading() {
        let backend = stub("BT /F1 10 Tf 14 TL 1 0 0 1 50 600 Tm (a) Tj T* (b) Tj ET");
        let runs = layout(&backend).text_runs(LETTER);
        let baseline_gap = runs[1].bbox.y1 - runs[0].bbox.y1;
        assert!((baseline_gap - 14.0).abs() < 1e-9);
        assert!((runs[1].bbox.x0 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_tj_array_inserts_word_gap() {
        let backend = stub("BT /F1 10 Tf 72 700 Td [(Hello) -300 (World)] TJ ET");
        let runs = layout(&backend).text_runs(LETTER);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hello World");
        // 10 glyphs * 8pt + 3pt gap
        assert!((runs[0].bbox.width() - 83.0).abs() < 1e-9);
    }

    #[test]
    fn test_quote_operators_move_to_next_line() {
        let backend = stub("BT /F1 10 Tf 12 TL 72 700 Td (a) Tj (b) ' 1 2 (c) \" ET");
        let page = layout(&backend);
        let ContentBlock::Text(block) = &page.blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(block.lines.len(), 3);
    }

    #[test]
    fn test_whitespace_runs_are_skipped() {
        let backend = stub("BT /F1 10 Tf 72 700 Td (   ) Tj ET");
        let page = layout(&backend);
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_text_outside_bt_is_ignored() {
        let backend = stub("/F1 10 Tf (stray) Tj");
        assert!(layout(&backend).text_runs(LETTER).is_empty());
    }

    #[test]
    fn test_missing_font_metrics_use_half_em() {
        let backend = stub("BT /F9 10 Tf 0 700 Td (abcd) Tj ET");
        let runs = layout(&backend).text_runs(LETTER);
        assert_eq!(runs[0].font, None);
        assert!((runs[0].bbox.x1 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_image_placement_from_ctm() {
        let mut backend = stub("q 100 0 0 50 72 600 cm /Im1 Do Q q 10 0 0 10 0 0 cm /Im1 Do Q");
        backend.xobjects.push(XObjectEntry {
            name: b"Im1".to_vec(),
            id: (7, 0),
            kind: XObjectKind::Image,
        });
        let page = layout(&backend);
        assert_eq!(page.blocks.len(), 2);

        let placements = page.image_placements(LETTER);
        let bbox = placements[&(7, 0)];
        assert_eq!(bbox, BBox::new(72.0, 142.0, 172.0, 192.0));
    }

    #[test]
    fn test_form_xobject_is_interpreted() {
        let mut backend = stub("q 1 0 0 1 100 0 cm /Fm1 Do Q");
        backend.xobjects.push(XObjectEntry {
            name: b"Fm1".to_vec(),
            id: (9, 0),
            kind: XObjectKind::Form([1.0, 0.0, 0.0, 1.0, 0.0, 100.0]),
        });
        backend
            .forms
            .insert((9, 0), b"BT /F1 10 Tf 0 0 Td (inside) Tj ET".to_vec());

        let runs = layout(&backend).text_runs(LETTER);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "inside");
        assert!((runs[0].bbox.x0 - 100.0).abs() < 1e-9);
        assert!((runs[0].bbox.y1 - 694.0).abs() < 1e-9);
    }

    #[test]
    fn test_media_box_offset() {
        let backend = stub("BT /F1 10 Tf 110 210 Td (x) Tj ET");
        let runs = layout(&backend).text_runs([100.0, 200.0, 400.0, 500.0]);
        assert!((runs[0].bbox.x0 - 10.0).abs() < 1e-9);
        assert!((runs[0].bbox.y1 - 292.0).abs() < 1e-9);
    }

    #[test]
    fn test_matrix_composition() {
        let scale = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = Matrix::translation(10.0, 5.0);
        assert_eq!(shift.then(&scale).apply(0.0, 0.0), (20.0, 10.0));
        assert_eq!(scale.then(&shift).apply(1.0, 1.0), (12.0, 7.0));
    }

    #[test]
    fn test_run_ops_with_decoded_operations() {
        let backend = stub("");
        let ops = decode_operations(b"BT /F1 8 Tf 0 0 Td (z) Tj ET").unwrap();
        let page = ContentInterpreter::new(&backend)
            .run_ops(Scope::Page((1, 0)), &ops)
            .unwrap();
        assert_eq!(page.text_runs(LETTER).len(), 1);
    }
}
