use lopdf::Document;
use std::sync::Arc;
use tracing::debug;

use super::rasterizer::PageRasterizer;
use super::{ExtractionError, ExtractionStrategy, StrategyChain};
use crate::models::{ExtractionCandidate, ExtractionMethod};
use crate::ocr::{ImagePreprocessor, OcrAdapter};

/// Page break emitted by pdf-extract between pages.
const FORM_FEED: char = '\x0C';

/// Native text layer, then rasterized OCR, then the legacy text reader.
pub fn pdf_chain(
    ocr: Arc<OcrAdapter>,
    preprocessor: ImagePreprocessor,
    rasterizer: Arc<dyn PageRasterizer>,
) -> StrategyChain<[u8]> {
    StrategyChain::new(vec![
        Box::new(TextLayer),
        Box::new(RasterOcr { rasterizer, preprocessor, ocr }),
        Box::new(LegacyText),
    ])
}

/// Formats numbered pages as `Page N:\n{text}` separated by a blank line.
/// Pages without visible text are left out; page numbers are kept as given.
pub fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = (usize, String)>,
{
    pages
        .into_iter()
        .filter_map(|(number, text)| {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(format!("Page {}:\n{}", number, text))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

struct TextLayer;

impl ExtractionStrategy<[u8]> for TextLayer {
    fn name(&self) -> &'static str {
        "pdf-text-layer"
    }

    fn attempt(&self, input: &[u8]) -> Result<Option<ExtractionCandidate>, ExtractionError> {
        let document = Document::load_mem(input).map_err(|e| ExtractionError::PdfParse {
            details: e.to_string(),
        })?;

        let pages = document.get_pages();
        debug!("PDF has {} pages", pages.len());

        let texts = pages.keys().map(|&number| {
            let text = document.extract_text(&[number]).unwrap_or_else(|e| {
                debug!("No text layer on page {}: {}", number, e);
                String::new()
            });
            (number as usize, text)
        });

        Ok(ExtractionCandidate::new(join_pages(texts), ExtractionMethod::PdfTextLayer))
    }
}

struct RasterOcr {
    rasterizer: Arc<dyn PageRasterizer>,
    preprocessor: ImagePreprocessor,
    ocr: Arc<OcrAdapter>,
}

impl ExtractionStrategy<[u8]> for RasterOcr {
    fn name(&self) -> &'static str {
        "pdf-raster-ocr"
    }

    fn attempt(&self, input: &[u8]) -> Result<Option<ExtractionCandidate>, ExtractionError> {
        let texts = self.rasterizer.rasterize(input).enumerate().map(|(index, page)| {
            let enhanced = self.preprocessor.enhance(&page);
            let text = self.ocr.extract_text(&enhanced);
            debug!("OCR read {} characters from page {}", text.chars().count(), index + 1);
            (index + 1, text)
        });

        Ok(ExtractionCandidate::new(join_pages(texts), ExtractionMethod::PdfRasterOcr))
    }
}

struct LegacyText;

impl ExtractionStrategy<[u8]> for LegacyText {
    fn name(&self) -> &'static str {
        "pdf-legacy-text"
    }

    fn attempt(&self, input: &[u8]) -> Result<Option<ExtractionCandidate>, ExtractionError> {
        let text = pdf_extract::extract_text_from_mem(input).map_err(|e| {
            ExtractionError::PdfParse { details: e.to_string() }
        })?;

        Ok(ExtractionCandidate::new(
            split_form_feed_pages(&text),
            ExtractionMethod::PdfLegacyText,
        ))
    }
}

/// Numbers the form-feed separated pages of pdf-extract output.
fn split_form_feed_pages(text: &str) -> String {
    join_pages(
        text.split(FORM_FEED)
            .enumerate()
            .map(|(index, page)| (index + 1, page.to_string())),
    )
}
