pub mod analysis;
pub mod assembler;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod routes;
pub mod swagger;

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use analysis::{gemini::GeminiClient, ReportInterpreter};
use config::Config;
use extraction::DocumentExtractor;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Long-lived collaborators shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub extractor: Arc<DocumentExtractor>,
    pub interpreter: ReportInterpreter,
}

impl AppState {
    pub fn new(config: Config, extractor: Arc<DocumentExtractor>, interpreter: ReportInterpreter) -> Self {
        Self { config, extractor, interpreter }
    }

    /// Tesseract engines, the PDFium rasterizer and a Gemini client, all
    /// configured from `config`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let extractor = Arc::new(DocumentExtractor::from_settings(&config.ocr));
        let model = Arc::new(GeminiClient::from_config(&config)?);
        let interpreter = ReportInterpreter::new(model, config.max_report_chars);
        Ok(Self::new(config, extractor, interpreter))
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/analyze", post(routes::analyze::analyze_report))
        .route("/analyze/document", post(routes::documents::analyze_document))
        .route("/extract", post(routes::documents::extract_document))
        .merge(swagger::create_swagger_router())
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_span))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs each request inside a span tagged with a fresh request id.
async fn request_span(request: Request, next: Next) -> Response {
    let span = info_span!(
        "request",
        id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let response = next.run(request).await;
        info!("Completed with {}", response.status());
        response
    }
    .instrument(span)
    .await
}

/// Installs the fmt subscriber. `RUST_LOG` overrides the default filter,
/// which keeps pdf_extract's warnings quiet.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,pdf_extract=error,glacier_care=info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
