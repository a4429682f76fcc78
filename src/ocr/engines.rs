use image::DynamicImage;
use tracing::debug;

#[cfg(feature = "ocr")]
use image::ImageFormat;
#[cfg(feature = "ocr")]
use std::io::Cursor;
#[cfg(feature = "ocr")]
use tesseract::{OcrEngineMode, PageSegMode, Tesseract};

use super::error::OcrError;
use super::OcrEngine;
use crate::config::OcrSettings;

/// Characters the conservative engine may emit: alphanumerics plus the
/// punctuation found in lab values, dosages and reference ranges.
pub const MEDICAL_CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,:;()[]{}%+-=<>/\\|\"'`~!@#$^&*_";

/// TSV level of a single recognized word.
const TSV_WORD_LEVEL: u32 = 5;

/// A word-level region reported by the neural engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedRegion {
    pub text: String,
    /// Confidence on a 0-1 scale.
    pub confidence: f32,
}

/// Parses Tesseract's TSV output into word regions. Header lines, non-word
/// levels and rows without text are skipped.
pub fn parse_tsv_regions(tsv: &str) -> Vec<RecognizedRegion> {
    tsv.lines()
        .filter_map(|line| {
            let columns: Vec<&str> = line.split('\t').collect();
            if columns.len() < 12 {
                return None;
            }
            let level: u32 = columns[0].trim().parse().ok()?;
            if level != TSV_WORD_LEVEL {
                return None;
            }
            let confidence: f32 = columns[10].trim().parse().ok()?;
            let text = columns[11..].join("\t").trim().to_string();
            if text.is_empty() || confidence < 0.0 {
                return None;
            }
            Some(RecognizedRegion {
                text,
                confidence: confidence / 100.0,
            })
        })
        .collect()
}

/// Joins the regions whose confidence exceeds `threshold` with single spaces.
pub fn join_confident_regions(regions: &[RecognizedRegion], threshold: f32) -> String {
    regions
        .iter()
        .filter(|region| region.confidence > threshold)
        .map(|region| region.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tesseract in LSTM (neural network) mode, filtered per word by confidence.
pub struct NeuralRegionEngine {
    language: String,
    min_confidence: f32,
}

impl NeuralRegionEngine {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            language: settings.language.clone(),
            min_confidence: settings.min_confidence,
        }
    }
}

impl OcrEngine for NeuralRegionEngine {
    fn name(&self) -> &'static str {
        "tesseract-lstm"
    }

    #[cfg(feature = "ocr")]
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let png = encode_png(image)?;

        let mut tesseract =
            Tesseract::new_with_oem(None, Some(&self.language), OcrEngineMode::LstmOnly)
                .map_err(|e| OcrError::InitializationFailed { details: e.to_string() })?
                .set_image_from_mem(&png)
                .map_err(|e| OcrError::InvalidImageFormat { details: e.to_string() })?
                .recognize()
                .map_err(|e| OcrError::RecognitionFailed { details: e.to_string() })?;

        let tsv = tesseract
            .get_tsv_text(0)
            .map_err(|e| OcrError::RecognitionFailed { details: e.to_string() })?;

        let regions = parse_tsv_regions(&tsv);
        let text = join_confident_regions(&regions, self.min_confidence);
        debug!(
            "{}: kept {} of {} regions above confidence {:.2}",
            self.name(),
            text.split(' ').filter(|w| !w.is_empty()).count(),
            regions.len(),
            self.min_confidence
        );
        Ok(text)
    }

    #[cfg(not(feature = "ocr"))]
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Err(OcrError::TesseractNotInstalled)
    }
}

/// Tesseract with a character whitelist, reading the page as a single block.
pub struct WhitelistEngine {
    language: String,
}

impl WhitelistEngine {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            language: settings.language.clone(),
        }
    }
}

impl OcrEngine for WhitelistEngine {
    fn name(&self) -> &'static str {
        "tesseract-whitelist"
    }

    #[cfg(feature = "ocr")]
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let png = encode_png(image)?;

        let mut tesseract =
            Tesseract::new_with_oem(None, Some(&self.language), OcrEngineMode::Default)
                .map_err(|e| OcrError::InitializationFailed { details: e.to_string() })?
                .set_variable("tessedit_char_whitelist", MEDICAL_CHAR_WHITELIST)
                .map_err(|e| OcrError::InitializationFailed { details: e.to_string() })?
                .set_image_from_mem(&png)
                .map_err(|e| OcrError::InvalidImageFormat { details: e.to_string() })?;
        tesseract.set_page_seg_mode(PageSegMode::PsmSingleBlock);

        let text = tesseract
            .get_text()
            .map_err(|e| OcrError::RecognitionFailed { details: e.to_string() })?;

        debug!("{}: recognized {} characters", self.name(), text.trim().chars().count());
        Ok(text)
    }

    #[cfg(not(feature = "ocr"))]
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Err(OcrError::TesseractNotInstalled)
    }
}

#[cfg(feature = "ocr")]
fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| OcrError::InvalidImageFormat { details: e.to_string() })?;
    Ok(buffer.into_inner())
}
