use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Tesseract is not installed on the system")]
    TesseractNotInstalled,

    #[error("Tesseract initialization failed: {details}")]
    InitializationFailed { details: String },

    #[error("Invalid image format or corrupted image: {details}")]
    InvalidImageFormat { details: String },

    #[error("Text recognition failed: {details}")]
    RecognitionFailed { details: String },

    #[error("OCR engine '{engine}' panicked")]
    EnginePanicked { engine: String },
}

impl OcrError {
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            OcrError::TesseractNotInstalled | OcrError::InitializationFailed { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            OcrError::TesseractNotInstalled => "OCR_NOT_INSTALLED",
            OcrError::InitializationFailed { .. } => "OCR_INIT_FAILED",
            OcrError::InvalidImageFormat { .. } => "OCR_INVALID_FORMAT",
            OcrError::RecognitionFailed { .. } => "OCR_RECOGNITION_FAILED",
            OcrError::EnginePanicked { .. } => "OCR_ENGINE_PANIC",
        }
    }
}
