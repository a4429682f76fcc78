use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use tracing::warn;

use super::ExtractionError;
use crate::models::{ExtractedText, ExtractionCandidate, ExtractionMethod};

/// Non-empty top-level paragraphs in document order, one per line.
pub fn paragraphs(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::WordDocument {
        details: e.to_string(),
    })?;

    let lines: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .filter(|line| !line.trim().is_empty())
        .collect();

    Ok(lines.join("\n"))
}

pub fn extract_word_document(bytes: &[u8], filename: &str) -> ExtractedText {
    match paragraphs(bytes) {
        Ok(text) => match ExtractionCandidate::new(text, ExtractionMethod::DocxParagraphs) {
            Some(candidate) => candidate.into(),
            None => ExtractedText::sentinel(format!("[DOCX] {} - No text found", filename)),
        },
        Err(e) => {
            warn!("Error processing word document {}: {}", filename, e);
            ExtractedText::sentinel(format!("[DOCX] {} - Processing failed: {}", filename, e))
        }
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut line = String::new();
    for child in &paragraph.children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, &mut line),
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        push_run_text(run, &mut line);
                    }
                }
            }
            _ => {}
        }
    }
    line
}

fn push_run_text(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => out.push_str(&text.text),
            RunChild::Tab(_) => out.push('\t'),
            _ => {}
        }
    }
}
