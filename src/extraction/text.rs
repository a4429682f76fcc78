use crate::models::{ExtractedText, ExtractionCandidate, ExtractionMethod};

/// Decodes UTF-8, replacing invalid sequences rather than failing.
pub fn extract_plain_text(bytes: &[u8], filename: &str) -> ExtractedText {
    let text = String::from_utf8_lossy(bytes).into_owned();
    match ExtractionCandidate::new(text, ExtractionMethod::PlainText) {
        Some(candidate) => candidate.into(),
        None => ExtractedText::sentinel(format!("[TEXT] {} - File is empty", filename)),
    }
}
