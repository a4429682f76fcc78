use image::DynamicImage;
use std::sync::Arc;

use super::{ExtractionError, ExtractionStrategy, StrategyChain};
use crate::models::{ExtractionCandidate, ExtractionMethod};
use crate::ocr::{ImagePreprocessor, OcrAdapter};

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
    image::load_from_memory(bytes).map_err(|e| ExtractionError::ImageDecode {
        details: e.to_string(),
    })
}

/// Enhanced bitmap first, then the bitmap exactly as uploaded.
pub fn image_chain(ocr: Arc<OcrAdapter>, preprocessor: ImagePreprocessor) -> StrategyChain<DynamicImage> {
    StrategyChain::new(vec![
        Box::new(EnhancedImageOcr { ocr: ocr.clone(), preprocessor }),
        Box::new(OriginalImageOcr { ocr }),
    ])
}

struct EnhancedImageOcr {
    ocr: Arc<OcrAdapter>,
    preprocessor: ImagePreprocessor,
}

impl ExtractionStrategy<DynamicImage> for EnhancedImageOcr {
    fn name(&self) -> &'static str {
        "enhanced-image-ocr"
    }

    fn attempt(&self, input: &DynamicImage) -> Result<Option<ExtractionCandidate>, ExtractionError> {
        let enhanced = self.preprocessor.enhance(input);
        Ok(ExtractionCandidate::new(
            self.ocr.extract_text(&enhanced),
            ExtractionMethod::ImageOcr,
        ))
    }
}

struct OriginalImageOcr {
    ocr: Arc<OcrAdapter>,
}

impl ExtractionStrategy<DynamicImage> for OriginalImageOcr {
    fn name(&self) -> &'static str {
        "original-image-ocr"
    }

    fn attempt(&self, input: &DynamicImage) -> Result<Option<ExtractionCandidate>, ExtractionError> {
        Ok(ExtractionCandidate::new(
            self.ocr.extract_text(input),
            ExtractionMethod::ImageOcr,
        ))
    }
}
