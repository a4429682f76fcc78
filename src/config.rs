use anyhow::{anyhow, Result};
use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_ALLOWED_CONTENT_TYPES: &str = "image/*,application/pdf,application/msword,application/vnd.openxmlformats-officedocument.wordprocessingml.document,text/plain";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_address: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_seconds: u64,
    pub max_file_size_mb: u64,
    pub max_report_chars: usize,
    pub allowed_content_types: Vec<String>,
    pub ocr: OcrSettings,
}

/// Tunables for the OCR pipeline. The defaults are empirical and may be
/// overridden per deployment.
#[derive(Clone, Debug, PartialEq)]
pub struct OcrSettings {
    pub language: String,
    pub min_confidence: f32,
    pub blur_sigma: f32,
    pub threshold_radius: u32,
    pub close_radius: u8,
    pub contrast_factor: f32,
    pub sharpness_factor: f32,
    pub pdf_render_dpi: u32,
    pub pdfium_library_path: Option<String>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            min_confidence: 0.5,
            blur_sigma: 1.1,
            threshold_radius: 5,
            close_radius: 1,
            contrast_factor: 1.5,
            sharpness_factor: 2.0,
            pdf_render_dpi: 300,
            pdfium_library_path: None,
        }
    }
}

impl OcrSettings {
    /// Reads `OCR_*`, `PDF_RENDER_DPI` and `PDFIUM_LIBRARY_PATH`, keeping the
    /// default for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = OcrSettings::default();

        OcrSettings {
            language: env::var("OCR_LANGUAGE").unwrap_or(defaults.language),
            min_confidence: parse_or("OCR_MIN_CONFIDENCE", defaults.min_confidence),
            blur_sigma: parse_or("OCR_BLUR_SIGMA", defaults.blur_sigma),
            threshold_radius: parse_or("OCR_THRESHOLD_RADIUS", defaults.threshold_radius),
            close_radius: parse_or("OCR_CLOSE_RADIUS", defaults.close_radius),
            contrast_factor: parse_or("OCR_CONTRAST_FACTOR", defaults.contrast_factor),
            sharpness_factor: parse_or("OCR_SHARPNESS_FACTOR", defaults.sharpness_factor),
            pdf_render_dpi: parse_or("PDF_RENDER_DPI", defaults.pdf_render_dpi),
            pdfium_library_path: env::var("PDFIUM_LIBRARY_PATH").ok(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("GEMINI_API_KEY environment variable is required"))?;

        Ok(Config {
            server_address: env::var("SERVER_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:5000".to_string()),
            gemini_api_key,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            gemini_timeout_seconds: parse_or("GEMINI_TIMEOUT_SECONDS", 60),
            max_file_size_mb: parse_or("MAX_FILE_SIZE_MB", 25),
            max_report_chars: parse_or("MAX_REPORT_CHARS", 100_000),
            allowed_content_types: parse_content_types(
                &env::var("ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_CONTENT_TYPES.to_string()),
            ),
            ocr: OcrSettings::from_env(),
        })
    }

    pub fn max_file_size_bytes(&self) -> usize {
        (self.max_file_size_mb as usize).saturating_mul(1024 * 1024)
    }

    /// Whether a declared MIME type may be accepted for upload. Entries ending
    /// in `/*` match the whole top-level type.
    pub fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let essence = crate::extraction::router::content_type_essence(content_type);
        self.allowed_content_types.iter().any(|allowed| {
            match allowed.strip_suffix("/*") {
                Some(prefix) => essence
                    .split_once('/')
                    .map(|(top, _)| top == prefix)
                    .unwrap_or(false),
                None => allowed == &essence,
            }
        })
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Debug>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for {}, using default {:?}", raw, name, default);
            default
        }),
        Err(_) => default,
    }
}

fn parse_content_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
