use std::sync::Arc;
use tracing::info;

use glacier_care::{config::Config, create_router, init_tracing, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    info!(
        "Using model {} with OCR language '{}' and {}MB upload limit",
        config.gemini_model, config.ocr.language, config.max_file_size_mb
    );

    let server_address = config.server_address.clone();
    let state = Arc::new(AppState::from_config(config)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    info!("Server starting on {}", server_address);
    info!("API documentation available at /swagger-ui");

    axum::serve(listener, app).await?;

    Ok(())
}
