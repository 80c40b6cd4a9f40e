//! The document driver.

use std::io::Read;
use std::path::Path;

use rayon::prelude::*;

use crate::error::Result;
use crate::model::PageContent;
use crate::parser::PdfParser;
use crate::shapes::ShapeClassifier;
use crate::slide::{DeckBuilder, DocumentProperties, Slide, SlideBuilder, SlideDocument, SlideSize};
use crate::style::StyleResolver;

use super::{ConversionStats, ConvertOptions};

/// Converts PDF bytes into a [`SlideDocument`], one slide per page.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
    resolver: StyleResolver,
    classifier: ShapeClassifier,
    builder: SlideBuilder,
}

impl Converter {
    /// Create a converter with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            resolver: StyleResolver::new(options.style.clone()),
            classifier: ShapeClassifier::new(options.classifier),
            builder: SlideBuilder::new().with_placement(options.placement),
            options,
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a PDF held in memory.
    pub fn convert(&self, pdf: &[u8]) -> Result<SlideDocument> {
        self.convert_with_stats(pdf).map(|(deck, _)| deck)
    }

    /// Convert a PDF file.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<SlideDocument> {
        let data = std::fs::read(path)?;
        self.convert(&data)
    }

    /// Convert a PDF read from a stream.
    pub fn convert_reader<R: Read>(&self, mut reader: R) -> Result<SlideDocument> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.convert(&data)
    }

    /// Convert a PDF and serialize the deck as `.pptx` bytes.
    pub fn convert_to_bytes(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        self.convert(pdf)?.to_pptx_bytes()
    }

    /// Convert a PDF and report what was produced.
    ///
    /// Pages are visited in order. Any page that cannot be parsed aborts the
    /// conversion; an image that cannot be decoded only loses its shapes.
    pub fn convert_with_stats(&self, pdf: &[u8]) -> Result<(SlideDocument, ConversionStats)> {
        let parser = PdfParser::from_bytes(pdf)?;
        let page_count = parser.page_count();
        let metadata = parser.metadata();

        let mut deck = DeckBuilder::new()
            .with_size(self.slide_size(&parser)?)
            .with_properties(DocumentProperties::from(&metadata));
        let mut stats = ConversionStats::new();

        if self.options.parallel && page_count > 1 {
            // Extraction shares the parsed document and stays on this
            // thread; slide building fans out per batch.
            let batch = rayon::current_num_threads().max(1) * 2;
            let mut start = 0;
            while start < page_count {
                let end = (start + batch).min(page_count);
                let pages = (start..end)
                    .map(|index| parser.extract_page(index))
                    .collect::<Result<Vec<_>>>()?;

                let built: Vec<(Slide, ConversionStats)> = pages
                    .into_par_iter()
                    .map(|page| self.build_slide(page))
                    .collect();

                for (slide, page_stats) in built {
                    stats.merge(&page_stats);
                    deck.push(slide);
                }
                start = end;
            }
        } else {
            for index in 0..page_count {
                let page = parser.extract_page(index)?;
                let (slide, page_stats) = self.build_slide(page);
                stats.merge(&page_stats);
                deck.push(slide);
            }
        }

        log::info!(
            "Converted {} page(s): {} text box(es), {} shape(s) from {} image(s), {} undecodable",
            stats.pages,
            stats.text_boxes,
            stats.shape_count(),
            stats.images,
            stats.image_decode_failures
        );
        Ok((deck.finish(), stats))
    }

    fn slide_size(&self, parser: &PdfParser) -> Result<SlideSize> {
        if self.options.match_page_size && parser.page_count() > 0 {
            let (width, height) = parser.page_size(0)?;
            return Ok(SlideSize::from_points(width, height));
        }
        Ok(self.options.slide_size)
    }

    fn build_slide(&self, page: PageContent) -> (Slide, ConversionStats) {
        let mut stats = ConversionStats {
            pages: 1,
            images: page.images.len(),
            ..Default::default()
        };
        let index = page.index;
        let mut failures = 0;

        let slide = self.builder.build(
            page,
            |run| self.resolver.resolve(run),
            |image| match self.classifier.classify(image) {
                Ok(shapes) => shapes,
                Err(e) => {
                    log::warn!(
                        "Page {}: {} image yields no shapes: {}",
                        index,
                        image.format.tag(),
                        e
                    );
                    failures += 1;
                    Vec::new()
                }
            },
        );

        stats.image_decode_failures = failures;
        stats.text_boxes = slide.text_boxes().count();
        for shape in slide.shapes() {
            stats.add_shape(shape.preset);
        }
        (slide, stats)
    }
}
