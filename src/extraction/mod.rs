pub mod docx;
pub mod image_ocr;
pub mod pdf;
pub mod rasterizer;
pub mod router;
pub mod text;

use image::DynamicImage;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::OcrSettings;
use crate::models::{DocumentKind, ExtractedText, ExtractionCandidate, RawDocument};
use crate::ocr::{ImagePreprocessor, OcrAdapter};
use rasterizer::{PageRasterizer, PdfiumRasterizer};

/// Failures inside a single strategy. These never leave the chain: they are
/// logged and the next strategy is tried.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Could not parse PDF: {details}")]
    PdfParse { details: String },

    #[error("Could not read word document: {details}")]
    WordDocument { details: String },

    #[error("Could not decode image: {details}")]
    ImageDecode { details: String },

    #[error("Strategy {strategy} panicked")]
    Panicked { strategy: String },
}

/// One way of turning an input into text.
///
/// `Ok(None)` means the strategy ran but found nothing.
pub trait ExtractionStrategy<Input: ?Sized>: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt(&self, input: &Input) -> Result<Option<ExtractionCandidate>, ExtractionError>;
}

/// Ordered strategies evaluated left to right. The first candidate wins and
/// the remaining strategies are never run.
pub struct StrategyChain<Input: ?Sized> {
    strategies: Vec<Box<dyn ExtractionStrategy<Input>>>,
}

impl<Input: ?Sized> StrategyChain<Input> {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy<Input>>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, input: &Input) -> Option<ExtractionCandidate> {
        for strategy in &self.strategies {
            let outcome = catch_unwind(AssertUnwindSafe(|| strategy.attempt(input)))
                .unwrap_or_else(|_| {
                    Err(ExtractionError::Panicked {
                        strategy: strategy.name().to_string(),
                    })
                });

            match outcome {
                Ok(Some(candidate)) => {
                    debug!("Strategy {} produced {} characters", strategy.name(), candidate.text.len());
                    return Some(candidate);
                }
                Ok(None) => debug!("Strategy {} found no text", strategy.name()),
                Err(e) => warn!("Strategy {} failed: {}", strategy.name(), e),
            }
        }
        None
    }
}

/// Routes a document to its extraction path and always returns non-empty
/// text, falling back to a bracketed sentinel.
pub struct DocumentExtractor {
    image_chain: StrategyChain<DynamicImage>,
    pdf_chain: StrategyChain<[u8]>,
}

impl DocumentExtractor {
    pub fn new(
        ocr: Arc<OcrAdapter>,
        preprocessor: ImagePreprocessor,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Self {
        Self {
            image_chain: image_ocr::image_chain(ocr.clone(), preprocessor.clone()),
            pdf_chain: pdf::pdf_chain(ocr, preprocessor, rasterizer),
        }
    }

    /// Production wiring: Tesseract engines and the PDFium rasterizer.
    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self::new(
            Arc::new(OcrAdapter::from_settings(settings)),
            ImagePreprocessor::new(settings),
            Arc::new(PdfiumRasterizer::new(settings)),
        )
    }

    pub fn extract(&self, document: &RawDocument) -> ExtractedText {
        let kind = DocumentKind::from_content_type(&document.content_type);
        let filename = document.filename.as_str();

        let extracted = match kind {
            DocumentKind::Image => self.extract_image(&document.bytes, filename),
            DocumentKind::Pdf => self.extract_pdf(&document.bytes, filename),
            DocumentKind::WordDocument => docx::extract_word_document(&document.bytes, filename),
            DocumentKind::PlainText => text::extract_plain_text(&document.bytes, filename),
            DocumentKind::Unsupported => ExtractedText::sentinel(format!(
                "[UNSUPPORTED] {} - File type not supported for processing",
                filename
            )),
        };

        info!(
            "Extracted {} characters from {} ({:?}) via {}",
            extracted.text().chars().count(),
            filename,
            kind,
            extracted.method()
        );
        extracted
    }

    fn extract_image(&self, bytes: &[u8], filename: &str) -> ExtractedText {
        let bitmap = match image_ocr::decode(bytes) {
            Ok(bitmap) => bitmap,
            Err(e) => {
                warn!("Error processing image {}: {}", filename, e);
                return ExtractedText::sentinel(format!(
                    "[IMAGE] {} - Processing failed: {}",
                    filename, e
                ));
            }
        };

        match self.image_chain.run(&bitmap) {
            Some(candidate) => candidate.into(),
            None => ExtractedText::sentinel(format!("[IMAGE] {} - No text detected", filename)),
        }
    }

    fn extract_pdf(&self, bytes: &[u8], filename: &str) -> ExtractedText {
        match self.pdf_chain.run(bytes) {
            Some(candidate) => candidate.into(),
            None => ExtractedText::sentinel(format!(
                "[PDF] {} - No text could be extracted",
                filename
            )),
        }
    }
}
