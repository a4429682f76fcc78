use crate::models::DocumentKind;

pub const WORD_DOCUMENT_TYPES: [&str; 2] = [
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Lowercased `type/subtype` with any parameters (`; charset=...`) removed.
pub fn content_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl DocumentKind {
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type_essence(content_type);

        if essence.starts_with("image/") {
            DocumentKind::Image
        } else if essence == "application/pdf" {
            DocumentKind::Pdf
        } else if WORD_DOCUMENT_TYPES.contains(&essence.as_str()) {
            DocumentKind::WordDocument
        } else if essence == "text/plain" {
            DocumentKind::PlainText
        } else {
            DocumentKind::Unsupported
        }
    }
}
