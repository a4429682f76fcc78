use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use super::InterpretationError;
use crate::models::{AnalysisReport, MedicationDetail, RiskLevel, NOT_SPECIFIED, UNKNOWN_MEDICATION};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("code fence pattern is valid"));

/// A report coerced into the schema, and whether anything had to change.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub report: AnalysisReport,
    pub repaired: bool,
}

/// Removes Markdown code fences (with or without a `json` tag) anywhere in
/// the reply.
pub fn strip_code_fences(reply: &str) -> String {
    CODE_FENCE.replace_all(reply.trim(), "").trim().to_string()
}

/// Strips fences, decodes strictly and normalizes the reply.
pub fn parse_reply(reply: &str) -> Result<Normalized, InterpretationError> {
    let cleaned = strip_code_fences(reply);
    let value: Value = serde_json::from_str(&cleaned)?;
    normalize(&value).ok_or(InterpretationError::NotAnObject)
}

/// Coerces an arbitrary JSON value into an [`AnalysisReport`].
///
/// Returns `None` only when `value` is not an object. Every other shape is
/// repaired: missing or mistyped lists become empty, unknown risk levels
/// become moderate, medication entries are filled with placeholders and
/// non-object entries are dropped.
pub fn normalize(value: &Value) -> Option<Normalized> {
    let object = value.as_object()?;
    let mut repaired = false;

    let (risk_level, risk_repaired) = match object.get("riskLevel").and_then(Value::as_str) {
        Some(raw) => match RiskLevel::parse(raw) {
            Some(level) => (level, false),
            None => (RiskLevel::Moderate, true),
        },
        None => (RiskLevel::Moderate, true),
    };
    repaired |= risk_repaired;

    let report = AnalysisReport {
        key_findings: string_list(object, "keyFindings", &mut repaired),
        explanations: string_list(object, "explanations", &mut repaired),
        recommendations: string_list(object, "recommendations", &mut repaired),
        urgent_care: string_list(object, "urgentCare", &mut repaired),
        medication_details: medications(object, &mut repaired),
        risk_level,
    };

    Some(Normalized { report, repaired })
}

fn string_list(object: &Map<String, Value>, field: &str, repaired: &mut bool) -> Vec<String> {
    let Some(items) = object.get(field).and_then(Value::as_array) else {
        *repaired = true;
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let text = scalar_text(item);
            if !item.is_string() {
                *repaired = true;
            }
            text
        })
        .collect()
}

fn medications(object: &Map<String, Value>, repaired: &mut bool) -> Vec<MedicationDetail> {
    let Some(entries) = object.get("medicationDetails").and_then(Value::as_array) else {
        *repaired = true;
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let Some(fields) = entry.as_object() else {
                *repaired = true;
                return None;
            };
            Some(MedicationDetail {
                name: text_field(fields, "name", UNKNOWN_MEDICATION, repaired),
                purpose: text_field(fields, "purpose", NOT_SPECIFIED, repaired),
                instructions: text_field(fields, "instructions", NOT_SPECIFIED, repaired),
                side_effects: text_field(fields, "sideEffects", NOT_SPECIFIED, repaired),
            })
        })
        .collect()
}

fn text_field(fields: &Map<String, Value>, key: &str, placeholder: &str, repaired: &mut bool) -> String {
    match fields.get(key) {
        Some(Value::String(text)) => text.clone(),
        other => {
            *repaired = true;
            other.and_then(scalar_text).unwrap_or_else(|| placeholder.to_string())
        }
    }
}

/// Strings as-is; numbers and booleans in their JSON spelling.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
