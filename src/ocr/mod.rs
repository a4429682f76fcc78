pub mod engines;
pub mod error;
pub mod preprocess;

use image::DynamicImage;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

use crate::config::OcrSettings;
use crate::ocr::engines::{NeuralRegionEngine, WhitelistEngine};
use crate::ocr::error::OcrError;

pub use preprocess::ImagePreprocessor;

/// A text recognition engine that works on a decoded bitmap.
pub trait OcrEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Runs every configured engine over a bitmap and keeps the best answer.
///
/// Engines are attempted in order and isolated from one another: an error or
/// panic in one is logged and counts as an empty result. The longest
/// non-empty text wins, with ties going to the engine attempted first.
pub struct OcrAdapter {
    engines: Vec<Box<dyn OcrEngine>>,
}

impl OcrAdapter {
    pub fn new(engines: Vec<Box<dyn OcrEngine>>) -> Self {
        Self { engines }
    }

    /// The neural engine followed by the whitelist engine.
    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self::new(vec![
            Box::new(NeuralRegionEngine::new(settings)),
            Box::new(WhitelistEngine::new(settings)),
        ])
    }

    pub fn engine_names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|engine| engine.name()).collect()
    }

    /// Returns the longest text any engine produced, or an empty string.
    pub fn extract_text(&self, image: &DynamicImage) -> String {
        let mut best: Option<(String, usize, &'static str)> = None;

        for engine in &self.engines {
            let Some(text) = run_isolated(engine.as_ref(), image) else {
                continue;
            };
            let length = text.chars().count();
            debug!("OCR engine {} produced {} characters", engine.name(), length);

            let is_longer = best
                .as_ref()
                .map_or(true, |(_, best_length, _)| length > *best_length);
            if is_longer {
                best = Some((text, length, engine.name()));
            }
        }

        match best {
            Some((text, length, engine)) => {
                debug!("Selected {} result ({} characters)", engine, length);
                text
            }
            None => String::new(),
        }
    }
}

/// Runs one engine, converting errors and panics into `None`. Blank output is
/// also `None`.
fn run_isolated(engine: &dyn OcrEngine, image: &DynamicImage) -> Option<String> {
    let outcome = catch_unwind(AssertUnwindSafe(|| engine.recognize(image)))
        .unwrap_or_else(|_| {
            Err(OcrError::EnginePanicked {
                engine: engine.name().to_string(),
            })
        });

    match outcome {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        }
        Err(e) if e.is_configuration_error() => {
            warn!("OCR engine {} unavailable [{}]: {}", engine.name(), e.error_code(), e);
            None
        }
        Err(e) => {
            warn!("OCR engine {} failed [{}]: {}", engine.name(), e.error_code(), e);
            None
        }
    }
}
