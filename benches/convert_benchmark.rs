//! Benchmarks for pdfdeck conversion performance.
//!
//! Run with: cargo bench
//!
//! Inputs are synthetic PDFs built with lopdf: every page carries a line of
//! text and a gray image holding one filled rectangle.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{GrayImage, Luma};
use lopdf::{dictionary, Document, Object, Stream};

const IMAGE_SIDE: u32 = 128;

fn rectangle_pixels() -> Vec<u8> {
    let mut pixels = vec![0u8; (IMAGE_SIDE * IMAGE_SIDE) as usize];
    for y in 32..96 {
        for x in 16..112 {
            pixels[(y * IMAGE_SIDE + x) as usize] = 255;
        }
    }
    pixels
}

/// Creates a PDF with the given number of pages.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => IMAGE_SIDE as i64,
            "Height" => IMAGE_SIDE as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8i64,
        },
        rectangle_pixels(),
    ));

    let kids: Vec<Object> = (0..page_count)
        .map(|i| {
            let text = format!(
                "BT /F1 12 Tf 72 700 Td (Slide {} - benchmark content for pdfdeck.) Tj ET \
                 q 256 0 0 256 72 300 cm /Im1 Do Q",
                i + 1
            );
            let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => Object::Reference(font_id) },
                    "XObject" => dictionary! { "Im1" => Object::Reference(image_id) },
                },
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Benchmark PDF format detection.
fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = create_test_pdf(1);
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| pdfdeck::detect_format_from_bytes(black_box(&pdf_data)).unwrap());
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| pdfdeck::detect_format_from_bytes(black_box(non_pdf_data)).is_err());
    });
}

/// Benchmark shape classification on a single decoded image.
fn bench_classifier(c: &mut Criterion) {
    let classifier = pdfdeck::ShapeClassifier::default();
    let luma = GrayImage::from_fn(IMAGE_SIDE, IMAGE_SIDE, |x, y| {
        let dx = x as f64 - 64.0;
        let dy = y as f64 - 64.0;
        if dx * dx + dy * dy <= 40.0 * 40.0 {
            Luma([255])
        } else {
            Luma([0])
        }
    });

    c.bench_function("classify_circle", |b| {
        b.iter(|| classifier.classify_luma(black_box(&luma)));
    });
}

/// Benchmark end-to-end conversion, parallel and sequential.
fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");

    for page_count in [1, 8, 32] {
        let data = create_test_pdf(page_count);

        group.bench_with_input(BenchmarkId::new("parallel", page_count), &data, |b, data| {
            let converter = pdfdeck::Converter::default();
            b.iter(|| converter.convert(black_box(data)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("sequential", page_count), &data, |b, data| {
            let converter = pdfdeck::Converter::new(pdfdeck::ConvertOptions::sequential());
            b.iter(|| converter.convert(black_box(data)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark writing the `.pptx` package.
fn bench_package(c: &mut Criterion) {
    let deck = pdfdeck::convert_bytes(&create_test_pdf(8)).unwrap();

    c.bench_function("write_pptx_8_slides", |b| {
        b.iter(|| black_box(&deck).to_pptx_bytes().unwrap());
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_classifier,
    bench_conversion,
    bench_package,
);
criterion_main!(benches);
