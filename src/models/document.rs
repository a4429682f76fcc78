use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// An uploaded file as received at the boundary.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }
}

/// Extraction entry point selected from a declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
    WordDocument,
    PlainText,
    Unsupported,
}

/// Identifies the strategy that produced a piece of text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    ImageOcr,
    PdfTextLayer,
    PdfRasterOcr,
    PdfLegacyText,
    DocxParagraphs,
    PlainText,
    Sentinel,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::ImageOcr => "image_ocr",
            ExtractionMethod::PdfTextLayer => "pdf_text_layer",
            ExtractionMethod::PdfRasterOcr => "pdf_raster_ocr",
            ExtractionMethod::PdfLegacyText => "pdf_legacy_text",
            ExtractionMethod::DocxParagraphs => "docx_paragraphs",
            ExtractionMethod::PlainText => "plain_text",
            ExtractionMethod::Sentinel => "sentinel",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text produced by a single strategy or engine. Never constructed with
/// blank text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionCandidate {
    pub text: String,
    pub method: ExtractionMethod,
}

impl ExtractionCandidate {
    /// Returns `None` when `text` has no visible content.
    pub fn new(text: impl Into<String>, method: ExtractionMethod) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self { text, method })
        }
    }
}

/// The text chosen for a document. Always non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    text: String,
    method: ExtractionMethod,
}

impl ExtractedText {
    pub fn sentinel(text: String) -> Self {
        debug_assert!(!text.is_empty());
        Self { text, method: ExtractionMethod::Sentinel }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    pub fn is_sentinel(&self) -> bool {
        self.method == ExtractionMethod::Sentinel
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl From<ExtractionCandidate> for ExtractedText {
    fn from(candidate: ExtractionCandidate) -> Self {
        Self {
            text: candidate.text,
            method: candidate.method,
        }
    }
}
