use axum::Router;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AnalysisOutcome, AnalysisReport, AnalysisResult, AnalyzeRequest, ExtractionMethod,
        ExtractionResult, HealthResponse, MedicationDetail, RequestMetadata, RiskLevel,
    },
    AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::analyze::analyze_report,
        crate::routes::documents::analyze_document,
        crate::routes::documents::extract_document,
    ),
    components(
        schemas(
            AnalyzeRequest, AnalysisReport, AnalysisResult, AnalysisOutcome, MedicationDetail,
            RequestMetadata, RiskLevel, ExtractionMethod, ExtractionResult, HealthResponse
        )
    ),
    tags(
        (name = "health", description = "Service status"),
        (name = "analysis", description = "Medical report explanation endpoints"),
        (name = "extraction", description = "Document text extraction endpoints"),
    ),
    info(
        title = "Glacier Care API",
        description = "Plain-language explanations of medical reports and scanned documents",
    )
)]
pub struct ApiDoc;

pub fn create_swagger_router() -> Router<Arc<AppState>> {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
