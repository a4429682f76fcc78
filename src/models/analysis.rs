use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub const UNKNOWN_MEDICATION: &str = "Unknown";
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }

    /// Exact match against the closed set; anything else is not a risk level.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(RiskLevel::Low),
            "moderate" => Some(RiskLevel::Moderate),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDetail {
    /// Medication name and dosage
    pub name: String,
    /// What the medicine does, in plain language
    pub purpose: String,
    /// When and how to take it
    pub instructions: String,
    /// Common side effects to watch for
    pub side_effects: String,
}

impl Default for MedicationDetail {
    fn default() -> Self {
        Self {
            name: UNKNOWN_MEDICATION.to_string(),
            purpose: NOT_SPECIFIED.to_string(),
            instructions: NOT_SPECIFIED.to_string(),
            side_effects: NOT_SPECIFIED.to_string(),
        }
    }
}

/// Canonical explanation of a medical report. Every field is always present
/// once a report has been through normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub key_findings: Vec<String>,
    pub explanations: Vec<String>,
    pub recommendations: Vec<String>,
    pub urgent_care: Vec<String>,
    pub medication_details: Vec<MedicationDetail>,
    pub risk_level: RiskLevel,
}

/// How a report was produced by the interpretation engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisOutcome {
    /// The service reply satisfied the schema as-is.
    Interpreted,
    /// The service replied but fields had to be defaulted or coerced.
    Repaired,
    /// The service was unusable; the fixed fallback report was returned.
    Fallback,
}

impl AnalysisOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisOutcome::Interpreted => "interpreted",
            AnalysisOutcome::Repaired => "repaired",
            AnalysisOutcome::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub report: AnalysisReport,
    pub outcome: AnalysisOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    /// Declared filename, empty when none was given
    pub filename: String,
    /// RFC 3339 timestamp of when the analysis finished
    pub analysis_timestamp: String,
    /// Length of the analysed text in characters
    pub report_length: usize,
    /// Tag of the interpretation backend
    pub ai_model: String,
    pub analysis_outcome: AnalysisOutcome,
    /// Extraction strategy that produced the text, for uploaded documents
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extraction_method: Option<String>,
}

/// A report together with the metadata of the request that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub metadata: RequestMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_serializes_wire_field_names() {
        let report = AnalysisReport {
            key_findings: vec!["Low hemoglobin".to_string()],
            medication_details: vec![MedicationDetail {
                name: "Metformin 500mg".to_string(),
                ..MedicationDetail::default()
            }],
            risk_level: RiskLevel::High,
            ..AnalysisReport::default()
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["keyFindings"], json!(["Low hemoglobin"]));
        assert_eq!(value["urgentCare"], json!([]));
        assert_eq!(value["riskLevel"], json!("high"));
        assert_eq!(value["medicationDetails"][0]["sideEffects"], json!("Not specified"));
        assert_eq!(value["medicationDetails"][0]["name"], json!("Metformin 500mg"));
    }

    #[test]
    fn test_risk_level_parse_is_exact() {
        assert_eq!(RiskLevel::parse("low"), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::parse("high"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("severe"), None);
        assert_eq!(RiskLevel::parse("High"), None);
        assert_eq!(RiskLevel::default(), RiskLevel::Moderate);
    }

    #[test]
    fn test_result_flattens_report_next_to_metadata() {
        let result = AnalysisResult {
            report: AnalysisReport::default(),
            metadata: RequestMetadata {
                filename: "labs.pdf".to_string(),
                analysis_timestamp: "2024-01-15T10:00:00+00:00".to_string(),
                report_length: 42,
                ai_model: "gemini-2.5-flash".to_string(),
                analysis_outcome: AnalysisOutcome::Repaired,
                extraction_method: None,
            },
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["riskLevel"], json!("moderate"));
        assert_eq!(value["metadata"]["reportLength"], json!(42));
        assert_eq!(value["metadata"]["analysisOutcome"], json!("repaired"));
        assert!(value["metadata"].get("extractionMethod").is_none());
    }
}
