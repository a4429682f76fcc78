use docx_rs::{Docx, Paragraph, Run};
use glacier_care::config::OcrSettings;
use glacier_care::extraction::rasterizer::{PageImages, PageRasterizer};
use glacier_care::extraction::DocumentExtractor;
use glacier_care::models::{ExtractionMethod, RawDocument};
use glacier_care::ocr::error::OcrError;
use glacier_care::ocr::{ImagePreprocessor, OcrAdapter, OcrEngine};
use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts calls and hands out a fixed number of blank pages.
struct CountingRasterizer {
    pages: usize,
    calls: AtomicUsize,
}

impl CountingRasterizer {
    fn new(pages: usize) -> Arc<Self> {
        Arc::new(Self { pages, calls: AtomicUsize::new(0) })
    }
}

impl PageRasterizer for CountingRasterizer {
    fn rasterize(&self, _pdf: &[u8]) -> PageImages {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let pages: Vec<DynamicImage> =
            (0..self.pages).map(|_| DynamicImage::ImageRgb8(RgbImage::new(16, 16))).collect();
        Box::new(pages.into_iter())
    }
}

/// Returns the same text for every bitmap and counts invocations.
struct FixedOcr {
    text: &'static str,
    calls: Arc<AtomicUsize>,
}

impl OcrEngine for FixedOcr {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.to_string())
    }
}

struct Pipeline {
    extractor: DocumentExtractor,
    rasterizer: Arc<CountingRasterizer>,
    ocr_calls: Arc<AtomicUsize>,
}

fn pipeline(ocr_text: &'static str, raster_pages: usize) -> Pipeline {
    let ocr_calls = Arc::new(AtomicUsize::new(0));
    let rasterizer = CountingRasterizer::new(raster_pages);
    let adapter = OcrAdapter::new(vec![Box::new(FixedOcr { text: ocr_text, calls: ocr_calls.clone() })]);

    Pipeline {
        extractor: DocumentExtractor::new(
            Arc::new(adapter),
            ImagePreprocessor::new(&OcrSettings::default()),
            rasterizer.clone(),
        ),
        rasterizer,
        ocr_calls,
    }
}

/// Single-page PDF whose content stream shows `text` (empty for a page
/// without a text layer).
fn single_page_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let operations = if text.is_empty() {
        vec![]
    } else {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    };
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn docx_bytes(lines: &[&str]) -> Vec<u8> {
    let mut docx = Docx::new();
    for line in lines {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
    }
    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).unwrap();
    buffer.into_inner()
}

fn png_bytes() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(24, 24, image::Rgb([240, 240, 240])))
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

#[test]
fn test_pdf_text_layer_short_circuits_raster_ocr() {
    let pipeline = pipeline("should not be used", 1);
    let document = RawDocument::new(
        single_page_pdf("Hemoglobin: 9.8 g/dL"),
        "cbc.pdf",
        "application/pdf",
    );

    let extracted = pipeline.extractor.extract(&document);

    assert_eq!(extracted.method(), ExtractionMethod::PdfTextLayer);
    assert!(extracted.text().starts_with("Page 1:\n"));
    assert!(extracted.text().contains("Hemoglobin: 9.8 g/dL"));
    assert_eq!(pipeline.rasterizer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(pipeline.ocr_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_scanned_pdf_falls_through_to_raster_ocr() {
    let pipeline = pipeline("Platelets 150 x10^3/uL", 2);
    let document = RawDocument::new(single_page_pdf(""), "scan.pdf", "application/pdf");

    let extracted = pipeline.extractor.extract(&document);

    assert_eq!(extracted.method(), ExtractionMethod::PdfRasterOcr);
    assert_eq!(
        extracted.text(),
        "Page 1:\nPlatelets 150 x10^3/uL\n\nPage 2:\nPlatelets 150 x10^3/uL"
    );
    assert_eq!(pipeline.rasterizer.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pdf_without_any_text_yields_sentinel() {
    let pipeline = pipeline("", 1);
    let document = RawDocument::new(single_page_pdf(""), "blank.pdf", "application/pdf");

    let extracted = pipeline.extractor.extract(&document);

    assert!(extracted.is_sentinel());
    assert_eq!(extracted.text(), "[PDF] blank.pdf - No text could be extracted");
}

#[test]
fn test_corrupt_pdf_yields_sentinel() {
    let pipeline = pipeline("", 0);
    let document = RawDocument::new(b"%PDF-1.7 truncated".to_vec(), "bad.pdf", "application/pdf");

    let extracted = pipeline.extractor.extract(&document);
    assert_eq!(extracted.text(), "[PDF] bad.pdf - No text could be extracted");
}

#[test]
fn test_image_is_read_with_ocr() {
    let pipeline = pipeline("TSH 2.1 mIU/L", 0);
    let document = RawDocument::new(png_bytes(), "thyroid.png", "image/png");

    let extracted = pipeline.extractor.extract(&document);

    assert_eq!(extracted.method(), ExtractionMethod::ImageOcr);
    assert_eq!(extracted.text(), "TSH 2.1 mIU/L");
}

#[test]
fn test_image_without_text_yields_sentinel() {
    let pipeline = pipeline("   ", 0);
    let document = RawDocument::new(png_bytes(), "blank.png", "image/png");

    let extracted = pipeline.extractor.extract(&document);

    assert_eq!(extracted.text(), "[IMAGE] blank.png - No text detected");
    // enhanced bitmap, then the original
    assert_eq!(pipeline.ocr_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_undecodable_image_reports_failure() {
    let pipeline = pipeline("unused", 0);
    let document = RawDocument::new(b"GIF89a-not-really".to_vec(), "broken.jpg", "image/jpeg");

    let extracted = pipeline.extractor.extract(&document);

    assert!(extracted.is_sentinel());
    assert!(extracted.text().starts_with("[IMAGE] broken.jpg - Processing failed: "));
    assert_eq!(pipeline.ocr_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_word_document_paragraphs() {
    let pipeline = pipeline("unused", 0);
    let document = RawDocument::new(
        docx_bytes(&["Impression:", "", "Mild cardiomegaly"]),
        "echo.docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    );

    let extracted = pipeline.extractor.extract(&document);

    assert_eq!(extracted.method(), ExtractionMethod::DocxParagraphs);
    assert_eq!(extracted.text(), "Impression:\nMild cardiomegaly");
}

#[test]
fn test_plain_text_with_charset_parameter() {
    let pipeline = pipeline("unused", 0);
    let document = RawDocument::new(
        b"Creatinine 1.1 mg/dL".to_vec(),
        "renal.txt",
        "Text/Plain; charset=utf-8",
    );

    let extracted = pipeline.extractor.extract(&document);
    assert_eq!(extracted.method(), ExtractionMethod::PlainText);
    assert_eq!(extracted.text(), "Creatinine 1.1 mg/dL");
}

#[test]
fn test_unknown_binary_yields_unsupported_sentinel() {
    let pipeline = pipeline("unused", 0);
    let document = RawDocument::new(vec![0, 1, 2, 3], "blob.bin", "application/unknown-binary");

    let extracted = pipeline.extractor.extract(&document);

    assert!(extracted.is_sentinel());
    assert_eq!(
        extracted.text(),
        "[UNSUPPORTED] blob.bin - File type not supported for processing"
    );
}

#[test]
fn test_extraction_is_never_empty() {
    let pipeline = pipeline("", 0);
    let content_types = [
        "image/png",
        "application/pdf",
        "application/msword",
        "text/plain",
        "application/zip",
        "",
    ];

    for content_type in content_types {
        for bytes in [Vec::new(), vec![0u8; 16]] {
            let document = RawDocument::new(bytes, "empty", content_type);
            let extracted = pipeline.extractor.extract(&document);
            assert!(
                !extracted.text().trim().is_empty(),
                "empty result for {content_type:?}"
            );
        }
    }
}
