use chrono::Utc;

use crate::models::{AnalysisResult, ExtractionMethod, Interpretation, RequestMetadata};

/// Attaches request metadata to an interpreted report.
pub fn assemble(
    interpretation: Interpretation,
    filename: Option<&str>,
    source_text: &str,
    ai_model: &str,
    extraction_method: Option<ExtractionMethod>,
) -> AnalysisResult {
    AnalysisResult {
        report: interpretation.report,
        metadata: RequestMetadata {
            filename: filename.unwrap_or_default().to_string(),
            analysis_timestamp: Utc::now().to_rfc3339(),
            report_length: source_text.chars().count(),
            ai_model: ai_model.to_string(),
            analysis_outcome: interpretation.outcome,
            extraction_method: extraction_method.map(|method| method.as_str().to_string()),
        },
    }
}
