const TRUNCATION_NOTICE: &str = "\n[... report truncated ...]";

/// Builds the directive sent to the language model. Reports longer than
/// `max_chars` characters are cut at a character boundary.
pub fn build_analysis_prompt(report_text: &str, filename: Option<&str>, max_chars: usize) -> String {
    let file_info = file_info(filename);
    let report = truncate_chars(report_text, max_chars);

    format!(
        r#"
You are a medical AI assistant that analyzes medical reports and provides clear explanations for patients.

Please analyze the following medical report{file_info} and provide a structured JSON output.
Focus especially on medications: extract each medication name, dosage, explain its purpose, how to take it, and common side effects.
If no medications are mentioned, return "medicationDetails": [].

Medical Report:
{report}

Respond ONLY with valid JSON in this format:

{{
  "keyFindings": ["..."],
  "explanations": ["..."],
  "recommendations": ["..."],
  "urgentCare": ["..."],
  "medicationDetails": [
    {{
      "name": "Medication name and dosage",
      "purpose": "What this medicine does in simple terms",
      "instructions": "When/how to take it",
      "sideEffects": "Common side effects to watch for"
    }}
  ],
  "riskLevel": "low|moderate|high"
}}
"#
    )
}

/// ` (from file: NAME)` when a non-blank filename is known, otherwise empty.
pub fn file_info(filename: Option<&str>) -> String {
    match filename.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!(" (from file: {})", name),
        None => String::new(),
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> std::borrow::Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_NOTICE).into(),
        None => text.into(),
    }
}
