pub mod gemini;
pub mod normalize;
pub mod prompt;

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::{AnalysisOutcome, AnalysisReport, Interpretation, RiskLevel};
use gemini::LanguageModel;

/// Why a service reply could not be used. Converted to the fallback report
/// before it leaves [`ReportInterpreter`].
#[derive(Error, Debug)]
pub enum InterpretationError {
    #[error("Request to language model failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Language model returned HTTP {status}: {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("Language model reply contained no text")]
    EmptyReply,

    #[error("Reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Reply JSON is not an object")]
    NotAnObject,
}

/// Turns report text into a schema-valid [`AnalysisReport`] using a
/// language model. Never fails: any problem yields the fallback report.
#[derive(Clone)]
pub struct ReportInterpreter {
    model: Arc<dyn LanguageModel>,
    max_report_chars: usize,
}

impl ReportInterpreter {
    pub fn new(model: Arc<dyn LanguageModel>, max_report_chars: usize) -> Self {
        Self { model, max_report_chars }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub async fn analyze(&self, report_text: &str, filename: Option<&str>) -> Interpretation {
        match self.interpret(report_text, filename).await {
            Ok(normalized) => {
                let outcome = if normalized.repaired {
                    warn!("Language model reply needed schema repair");
                    AnalysisOutcome::Repaired
                } else {
                    AnalysisOutcome::Interpreted
                };
                info!(
                    "Report interpreted ({}), risk level {}",
                    outcome.as_str(),
                    normalized.report.risk_level
                );
                Interpretation { report: normalized.report, outcome }
            }
            Err(e) => {
                error!("Error analyzing report: {}", e);
                Interpretation {
                    report: fallback_report(filename),
                    outcome: AnalysisOutcome::Fallback,
                }
            }
        }
    }

    async fn interpret(
        &self,
        report_text: &str,
        filename: Option<&str>,
    ) -> Result<normalize::Normalized, InterpretationError> {
        let prompt = prompt::build_analysis_prompt(report_text, filename, self.max_report_chars);
        let reply = self.model.generate(&prompt).await?;
        normalize::parse_reply(&reply)
    }
}

/// Fixed, always-valid report used when the service cannot be used.
pub fn fallback_report(filename: Option<&str>) -> AnalysisReport {
    let file_info = prompt::file_info(filename);
    AnalysisReport {
        key_findings: vec![
            format!("Report analysis completed{}", file_info),
            "Unable to provide detailed AI analysis at this time".to_string(),
            "Please consult your healthcare provider".to_string(),
        ],
        explanations: vec![
            "We had a technical issue while analyzing your report.".to_string(),
            "This does not reflect your health status.".to_string(),
            "Your healthcare provider can give a detailed explanation.".to_string(),
        ],
        recommendations: vec![
            "Contact your healthcare provider for interpretation".to_string(),
            "Keep a copy of your medical report".to_string(),
            "Schedule a follow-up appointment".to_string(),
        ],
        urgent_care: vec![
            "Seek immediate care if you have severe symptoms".to_string(),
            "Do not delay urgent medical attention".to_string(),
        ],
        medication_details: Vec::new(),
        risk_level: RiskLevel::Moderate,
    }
}
