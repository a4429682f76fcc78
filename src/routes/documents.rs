use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    assembler,
    errors::ApiError,
    models::{
        AnalysisResponse, AnalysisResult, ApiResponse, ExtractedText, ExtractionResult,
        RawDocument,
    },
    AppState,
};

const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

/// Extract the text of an uploaded document and explain it
#[utoipa::path(
    post,
    path = "/analyze/document",
    tag = "analysis",
    request_body(content = String, description = "Document in a `file` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Structured explanation of the document", body = ApiResponse<AnalysisResult>),
        (status = 400, description = "Missing, empty or unsupported file"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn analyze_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let document = read_upload(&state, multipart).await?;
    let filename = document.filename.clone();
    let extracted = extract_blocking(&state, document).await?;

    let interpretation = state
        .interpreter
        .analyze(extracted.text(), Some(&filename))
        .await;
    let result = assembler::assemble(
        interpretation,
        Some(&filename),
        extracted.text(),
        state.interpreter.model_name(),
        Some(extracted.method()),
    );

    Ok(Json(ApiResponse::success(result)))
}

/// Extract the text of an uploaded document without interpreting it
#[utoipa::path(
    post,
    path = "/extract",
    tag = "extraction",
    request_body(content = String, description = "Document in a `file` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Extracted text", body = ApiResponse<ExtractionResult>),
        (status = 400, description = "Missing, empty or unsupported file"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn extract_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ExtractionResult>>, ApiError> {
    let document = read_upload(&state, multipart).await?;
    let filename = document.filename.clone();
    let content_type = document.content_type.clone();
    let extracted = extract_blocking(&state, document).await?;

    Ok(Json(ApiResponse::success(ExtractionResult {
        filename,
        content_type,
        character_count: extracted.text().chars().count(),
        method: extracted.method(),
        text: extracted.into_text(),
    })))
}

/// Reads the `file` field and validates it against the upload limits.
async fn read_upload(state: &AppState, mut multipart: Multipart) -> Result<RawDocument, ApiError> {
    let mut uploaded = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_string();
        let declared = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        let content_type = resolve_content_type(declared.as_deref(), &filename);
        uploaded = Some(RawDocument::new(data.to_vec(), filename, content_type));
    }

    let document = uploaded.ok_or_else(|| ApiError::bad_request("No file provided"))?;

    if document.bytes.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let max_file_size_bytes = state.config.max_file_size_bytes();
    if document.bytes.len() > max_file_size_bytes {
        error!(
            "File '{}' size ({} bytes) exceeds maximum allowed size ({} bytes / {}MB)",
            document.filename,
            document.bytes.len(),
            max_file_size_bytes,
            state.config.max_file_size_mb
        );
        return Err(ApiError::PayloadTooLarge {
            message: format!("File exceeds the {}MB limit", state.config.max_file_size_mb),
        });
    }

    if !state.config.is_content_type_allowed(&document.content_type) {
        return Err(ApiError::UnsupportedFileType {
            content_type: document.content_type,
        });
    }

    info!(
        "Received document: {} ({}, {} bytes)",
        document.filename,
        document.content_type,
        document.bytes.len()
    );
    Ok(document)
}

/// Declared type, or a guess from the file extension when the client sent
/// none or a generic binary type.
fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    match declared.map(str::trim) {
        Some(declared) if !declared.is_empty() && declared != GENERIC_CONTENT_TYPE => {
            declared.to_string()
        }
        _ => mime_guess::from_path(filename)
            .first_raw()
            .unwrap_or(GENERIC_CONTENT_TYPE)
            .to_string(),
    }
}

async fn extract_blocking(state: &AppState, document: RawDocument) -> Result<ExtractedText, ApiError> {
    let extractor = state.extractor.clone();
    tokio::task::spawn_blocking(move || extractor.extract(&document))
        .await
        .map_err(|e| ApiError::internal(format!("Extraction task failed: {}", e)))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { message: e.body_text() }
    } else {
        ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text()))
    }
}
