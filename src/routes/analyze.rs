use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use std::sync::Arc;
use tracing::info;

use crate::{
    assembler,
    errors::ApiError,
    models::{AnalysisResponse, AnalysisResult, AnalyzeRequest, ApiResponse},
    AppState,
};

/// Explain a free-text medical report
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "analysis",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Structured explanation of the report", body = ApiResponse<AnalysisResult>),
        (status = 400, description = "Body is not JSON or report text is missing"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn analyze_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| match rejection {
        JsonRejection::MissingJsonContentType(_) => ApiError::bad_request("Request must be JSON"),
        other => ApiError::bad_request(format!("Invalid JSON body: {}", other.body_text())),
    })?;

    let report_text = request.report_text.trim();
    if report_text.is_empty() {
        return Err(ApiError::bad_request("Report text is required"));
    }

    let filename = request
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    info!(
        "Analyzing report: {} chars, filename: {}",
        report_text.chars().count(),
        filename.unwrap_or("-")
    );

    let interpretation = state.interpreter.analyze(report_text, filename).await;
    let result = assembler::assemble(
        interpretation,
        filename,
        report_text,
        state.interpreter.model_name(),
        None,
    );

    Ok(Json(ApiResponse::success(result)))
}
