use glacier_care::analysis::gemini::{GeminiClient, LanguageModel};
use glacier_care::analysis::{InterpretationError, ReportInterpreter};
use glacier_care::models::{AnalysisOutcome, RiskLevel};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const MODEL: &str = "gemini-2.5-flash";
const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(server.uri(), "test-api-key", MODEL, Duration::from_secs(2)).unwrap()
}

fn reply_with_text(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_generate_returns_first_text_part() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-api-key"))
        .and(body_partial_json(json!({"contents": [{"parts": [{"text": "hello"}]}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_with_text("{\"riskLevel\":\"low\"}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = client_for(&mock_server).generate("hello").await.unwrap();
    assert_eq!(text, "{\"riskLevel\":\"low\"}");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server).generate("hello").await.unwrap_err();
    match error {
        InterpretationError::ServiceStatus { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_reply_without_candidates_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server).generate("hello").await.unwrap_err();
    assert!(matches!(error, InterpretationError::EmptyReply));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply_with_text("{}"))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&mock_server)
        .await;

    let client =
        GeminiClient::new(mock_server.uri(), "test-api-key", MODEL, Duration::from_millis(200)).unwrap();
    let error = client.generate("hello").await.unwrap_err();
    assert!(matches!(error, InterpretationError::Request(_)));
}

#[tokio::test]
async fn test_interpreter_over_http_parses_fenced_reply() {
    let mock_server = MockServer::start().await;
    let fenced = "```json\n{\"keyFindings\":[\"Hemoglobin is low\"],\"explanations\":[],\"recommendations\":[\"Eat iron-rich foods\"],\"urgentCare\":[],\"medicationDetails\":[],\"riskLevel\":\"moderate\"}\n```";

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_with_text(fenced)))
        .mount(&mock_server)
        .await;

    let interpreter = ReportInterpreter::new(Arc::new(client_for(&mock_server)), 10_000);
    let interpretation = interpreter.analyze("Hemoglobin: 9.8 g/dL", Some("cbc.pdf")).await;

    assert_eq!(interpretation.outcome, AnalysisOutcome::Interpreted);
    assert_eq!(interpretation.report.key_findings, vec!["Hemoglobin is low"]);
    assert_eq!(interpretation.report.recommendations, vec!["Eat iron-rich foods"]);
}

#[tokio::test]
async fn test_interpreter_over_http_falls_back_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let interpreter = ReportInterpreter::new(Arc::new(client_for(&mock_server)), 10_000);
    let interpretation = interpreter.analyze("LDL 190 mg/dL", None).await;

    assert_eq!(interpretation.outcome, AnalysisOutcome::Fallback);
    assert_eq!(interpretation.report.risk_level, RiskLevel::Moderate);
    assert!(!interpretation.report.recommendations.is_empty());
}
